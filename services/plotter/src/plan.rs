//! What a run plots: input file, output directory, variables and depths
//! for each forecast model.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use catalog::RegionSet;
use chrono::{DateTime, Utc};

/// Forecast model selector given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Model {
    /// Wave forecast
    Inawaves,
    /// Ocean flow forecast, plotted per depth
    Inaflows,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown model '{0}', expected 'inawaves' or 'inaflows'")]
pub struct UnknownModel(pub String);

impl FromStr for Model {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inawaves" => Ok(Model::Inawaves),
            "inaflows" => Ok(Model::Inaflows),
            other => Err(UnknownModel(other.to_string())),
        }
    }
}

impl Model {
    pub fn as_str(&self) -> &'static str {
        match self {
            Model::Inawaves => "inawaves",
            Model::Inaflows => "inaflows",
        }
    }

    fn input_template(&self) -> &'static str {
        match self {
            Model::Inawaves => "/home/model-admin/ofs-prod/inawaves/post/w3g_hires_%Y%m%d_%H00.nc",
            Model::Inaflows => "/data/ofs/output/nc/inaflows/%Y/%m/InaFlows_%Y%m%d_%H00.nc",
        }
    }

    fn output_template(&self) -> &'static str {
        match self {
            Model::Inawaves => "/data/ofs/output/img/inawaves/%Y/%m/%Y%m%d%H",
            Model::Inaflows => "/data/ofs/output/img/inaflows/%Y/%m/%Y%m%d%H",
        }
    }

    /// Variable codes of a full run, in batch order.
    pub fn default_variables(&self) -> &'static [&'static str] {
        match self {
            Model::Inawaves => &["ws", "swh", "mwh", "psh", "wmp", "wml", "psp", "wsh", "wsp"],
            Model::Inaflows => &["csd", "s", "st", "sl"],
        }
    }

    /// Depth levels in metres; empty for models without a depth axis.
    pub fn depths(&self) -> &'static [f64] {
        match self {
            Model::Inawaves => &[],
            Model::Inaflows => &[0.0, 10.0, 25.0, 50.0, 100.0, 250.0],
        }
    }

    /// Dataset variables whose missing values are plotted as zero.
    pub fn fill_zero(&self) -> &'static [&'static str] {
        match self {
            Model::Inawaves => &["uwnd", "vwnd", "hs", "hmax", "t01", "lm"],
            Model::Inaflows => &[],
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One image to produce.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotTask {
    pub time_index: usize,
    pub variable: String,
    pub region: String,
    pub depth: Option<f64>,
}

/// Everything a run needs to know before the dataset is opened.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub model: Model,
    pub base_run: DateTime<Utc>,
    pub input: PathBuf,
    pub out_dir: PathBuf,
    pub region_set: RegionSet,
    pub variables: Vec<String>,
    pub depths: Vec<f64>,
    pub fill_zero: Vec<String>,
}

impl RunPlan {
    /// Production defaults for a model cycle.
    pub fn new(model: Model, base_run: DateTime<Utc>) -> Self {
        Self {
            model,
            base_run,
            input: PathBuf::from(base_run.format(model.input_template()).to_string()),
            out_dir: PathBuf::from(base_run.format(model.output_template()).to_string()),
            region_set: RegionSet::Wilpro,
            variables: model.default_variables().iter().map(|s| s.to_string()).collect(),
            depths: model.depths().to_vec(),
            fill_zero: model.fill_zero().iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_input(mut self, input: PathBuf) -> Self {
        self.input = input;
        self
    }

    pub fn with_out_dir(mut self, out_dir: PathBuf) -> Self {
        self.out_dir = out_dir;
        self
    }

    pub fn with_region_set(mut self, set: RegionSet) -> Self {
        self.region_set = set;
        self
    }

    /// Restrict the run to these variable codes. An empty list keeps the
    /// model defaults.
    pub fn with_variables(mut self, variables: Vec<String>) -> Self {
        if !variables.is_empty() {
            self.variables = variables;
        }
        self
    }

    /// Cartesian product of time steps, variables, regions and depths.
    pub fn tasks<S: AsRef<str>>(&self, n_times: usize, regions: &[S]) -> Vec<PlotTask> {
        let depths: Vec<Option<f64>> = if self.depths.is_empty() {
            vec![None]
        } else {
            self.depths.iter().copied().map(Some).collect()
        };

        let mut tasks =
            Vec::with_capacity(n_times * self.variables.len() * regions.len() * depths.len());
        for time_index in 0..n_times {
            for variable in &self.variables {
                for region in regions {
                    for &depth in &depths {
                        tasks.push(PlotTask {
                            time_index,
                            variable: variable.clone(),
                            region: region.as_ref().to_string(),
                            depth,
                        });
                    }
                }
            }
        }
        tasks
    }
}

/// Log file of a run started at `now`:
/// `{log_dir}/%Y/%m/%Y%m%d/plotting_{model}_%Y%m%d_%H.log`.
pub fn log_file_path(log_dir: &Path, model: Model, now: DateTime<Utc>) -> PathBuf {
    log_dir
        .join(now.format("%Y/%m/%Y%m%d").to_string())
        .join(now.format(&format!("plotting_{}_%Y%m%d_%H.log", model)).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ofs_common::parse_model_cycle;

    #[test]
    fn test_model_parse() {
        assert_eq!("inawaves".parse::<Model>().unwrap(), Model::Inawaves);
        assert_eq!("inaflows".parse::<Model>().unwrap(), Model::Inaflows);
        assert!("inawave".parse::<Model>().is_err());
        assert!("INAWAVES".parse::<Model>().is_err());
    }

    #[test]
    fn test_wave_plan_paths() {
        let base = parse_model_cycle("2024102000").unwrap();
        let plan = RunPlan::new(Model::Inawaves, base);
        assert_eq!(
            plan.input,
            PathBuf::from("/home/model-admin/ofs-prod/inawaves/post/w3g_hires_20241020_0000.nc")
        );
        assert_eq!(
            plan.out_dir,
            PathBuf::from("/data/ofs/output/img/inawaves/2024/10/2024102000")
        );
        assert_eq!(plan.variables.len(), 9);
        assert!(plan.depths.is_empty());
        assert!(plan.fill_zero.contains(&"hs".to_string()));
    }

    #[test]
    fn test_flow_plan_paths() {
        let base = parse_model_cycle("2024102012").unwrap();
        let plan = RunPlan::new(Model::Inaflows, base);
        assert_eq!(
            plan.input,
            PathBuf::from("/data/ofs/output/nc/inaflows/2024/10/InaFlows_20241020_1200.nc")
        );
        assert_eq!(plan.variables, vec!["csd", "s", "st", "sl"]);
        assert_eq!(plan.depths, vec![0.0, 10.0, 25.0, 50.0, 100.0, 250.0]);
        assert!(plan.fill_zero.is_empty());
    }

    #[test]
    fn test_task_product() {
        let base = parse_model_cycle("2024102000").unwrap();
        let wave = RunPlan::new(Model::Inawaves, base);
        let tasks = wave.tasks(3, &["aceh", "bali"]);
        assert_eq!(tasks.len(), 3 * 9 * 2);
        assert_eq!(tasks[0].variable, "ws");
        assert_eq!(tasks[0].region, "aceh");
        assert_eq!(tasks[1].region, "bali");
        assert!(tasks.iter().all(|t| t.depth.is_none()));

        let flow = RunPlan::new(Model::Inaflows, base).with_variables(vec!["s".to_string()]);
        let tasks = flow.tasks(2, &["bali"]);
        assert_eq!(tasks.len(), 2 * 6);
        assert_eq!(tasks[1].depth, Some(10.0));
        assert_eq!(tasks[6].time_index, 1);
    }

    #[test]
    fn test_empty_variable_override_keeps_defaults() {
        let base = parse_model_cycle("2024102000").unwrap();
        let plan = RunPlan::new(Model::Inaflows, base).with_variables(Vec::new());
        assert_eq!(plan.variables.len(), 4);
    }

    #[test]
    fn test_log_file_path() {
        let now = parse_model_cycle("2024102107").unwrap();
        let path = log_file_path(Path::new("/logs"), Model::Inawaves, now);
        assert_eq!(
            path,
            PathBuf::from("/logs/2024/10/20241021/plotting_inawaves_20241021_07.log")
        );
    }
}
