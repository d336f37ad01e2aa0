use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const REPO_RUBRIC: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../rubric.yaml");

const LTR_VARS: &[&str] = &[
    "LTR_RUBRIC",
    "LTR_AUDIT_ENABLED",
    "LTR_AUDIT_LOG_DIR",
    "LTR_AUDIT_LOG_FILE",
    "LTR_CASES_DIR",
    "LTR_PROPOSAL_PATH",
    "LTR_REGRESSION_PATH",
    "LTR_COLOR",
    "LTR_LOG_LEVEL",
];

/// A scratch working directory with its own rubric, config file and corpus.
pub struct TestEnv {
    pub dir: TempDir,
    pub rubric: PathBuf,
    pub config: PathBuf,
    pub cases: PathBuf,
    pub audit_log: PathBuf,
    pub proposal: PathBuf,
    pub regression: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        crate::test_log!("FIXTURE: Creating ltr test environment");

        let dir = TempDir::new().expect("Failed to create temp dir");
        let root = dir.path();
        let rubric = root.join("rubric.yaml");
        let cases = root.join("cases");
        let audit_log = root.join("logs").join("audit.jsonl");
        let proposal = root.join("proposal.yaml");
        let regression = root.join("case-regression.json");
        let config = root.join("ltr.toml");

        fs::copy(REPO_RUBRIC, &rubric).expect("Failed to copy rubric");
        fs::create_dir_all(&cases).expect("Failed to create cases dir");
        fs::write(
            &config,
            format!(
                r#"rubric_path = "{}"

[audit]
enabled = true
log_file = "{}"

[cases]
dir = "{}"
proposal_path = "{}"
regression_path = "{}"

[output]
color = false

[log]
level = "warn"
"#,
                toml_path(&rubric),
                toml_path(&audit_log),
                toml_path(&cases),
                toml_path(&proposal),
                toml_path(&regression),
            ),
        )
        .expect("Failed to write ltr.toml");

        Self {
            dir,
            rubric,
            config,
            cases,
            audit_log,
            proposal,
            regression,
        }
    }

    /// Writes a case folder with the given files.
    pub fn add_case(&self, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let case_dir = self.cases.join(name);
        fs::create_dir_all(&case_dir).expect("Failed to create case dir");
        for (file, content) in files {
            fs::write(case_dir.join(file), content).expect("Failed to write case file");
        }
        case_dir
    }

    pub fn run(&self, args: &[&str]) -> LtrRun {
        self.run_with_env(args, &[])
    }

    /// Runs with extra environment variables set after the `LTR_*` scrub.
    pub fn run_with_env(&self, args: &[&str], vars: &[(&str, &str)]) -> LtrRun {
        let mut command = Command::new(env!("CARGO_BIN_EXE_ltr"));
        command
            .current_dir(self.dir.path())
            .arg("--config")
            .arg(&self.config)
            .args(args)
            .env("NO_COLOR", "1");
        for var in LTR_VARS {
            command.env_remove(var);
        }
        command.envs(vars.iter().copied());

        let output = command.output().expect("Failed to run ltr");
        let run = LtrRun {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        crate::test_log!(?args, success = run.success, "ltr finished");
        run
    }
}

fn toml_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "\\\\")
}

#[derive(Debug)]
pub struct LtrRun {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl LtrRun {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {}", self.stdout))
    }
}
