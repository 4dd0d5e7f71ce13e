//! End-to-end runs of the `initjob` binary against mock HTTP servers.

use std::path::PathBuf;
use std::process::{Command, Output};

use initjob_core::{IndexRegistration, IndexUrl, MetadataStore, SqliteStore};
use mockito::{Matcher, Server};
use tempfile::TempDir;

const THOTH_ENV: &[&str] = &[
    "THOTH_VERBOSE_INIT_JOB",
    "THOTH_INIT_JOB_DRY_RUN",
    "THOTH_INIT_JOB_INDEX_BASE_URL",
    "THOTH_INIT_JOB_DISCOVERY_DEPTH",
    "THOTH_INIT_JOB_INITIALIZE_SCHEMA",
    "THOTH_INIT_JOB_REGISTER_INDEXES",
    "THOTH_INIT_JOB_SOLVE_CORE",
    "THOTH_INIT_JOB_SOLVE_DATA_SCIENCE",
    "THOTH_INIT_JOB_DATA_SCIENCE_PACKAGES",
    "THOTH_INIT_JOB_USE_WORKFLOW",
    "THOTH_DATABASE_PATH",
    "THOTH_SCHEDULER_URL",
    "THOTH_RESULT_API_URL",
];

/// Test context with a private database location
struct TestContext {
    temp_dir: TempDir,
    db_path: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let db_path = temp_dir.path().join("store").join("initjob.db");
        Self { temp_dir, db_path }
    }

    fn initjob_cmd(&self) -> Command {
        let bin_path = env!("CARGO_BIN_EXE_initjob");
        let mut cmd = Command::new(bin_path);
        for var in THOTH_ENV {
            cmd.env_remove(var);
        }
        cmd.env_remove("RUST_LOG");
        cmd.env("HOME", self.temp_dir.path());
        cmd.arg("--database-path").arg(&self.db_path);
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.initjob_cmd()
            .args(args)
            .output()
            .expect("failed to run initjob")
    }

    fn seed(&self, urls: &[String]) {
        let store = SqliteStore::open(&self.db_path).unwrap();
        store.initialize_schema().unwrap();
        for url in urls {
            store
                .register_index(&IndexRegistration::discovered(IndexUrl::new(url).unwrap()))
                .unwrap();
        }
    }
}

fn table(entries: &[&str]) -> String {
    let rows: String = entries
        .iter()
        .map(|e| format!("<tr><td><a href=\"{e}\">{e}</a></td></tr>"))
        .collect();
    format!(
        "<html><body><table><tr><td><a href=\"/\">Parent Directory</a></td></tr>{rows}</table></body></html>"
    )
}

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx.initjob_cmd().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("--register-indexes"));
}

#[test]
fn test_version_command() {
    let ctx = TestContext::new();
    let output = ctx.initjob_cmd().arg("--version").output().unwrap();
    assert!(output.status.success());
}

#[test]
fn test_no_steps_is_a_noop() {
    let ctx = TestContext::new();
    let output = ctx.run(&[]);
    assert!(output.status.success());
    assert!(!ctx.db_path.exists());
}

#[test]
fn test_initialize_and_register() {
    let mut server = Server::new();
    let _root = server
        .mock("GET", "/index/")
        .with_status(200)
        .with_body(table(&["fedora/", "rhel/"]))
        .create();
    let _fedora = server
        .mock("GET", "/index/fedora/")
        .with_status(200)
        .with_body(table(&["simple/", "jdk/"]))
        .create();
    let _rhel = server
        .mock("GET", "/index/rhel/")
        .with_status(200)
        .with_body(table(&["wheels/"]))
        .create();

    let ctx = TestContext::new();
    let base = format!("{}/index", server.url());
    let output = ctx.run(&[
        "--initialize-schema",
        "--register-indexes",
        "--index-base-url",
        &base,
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No simple/ directory found"));
    assert!(stderr.contains("is not PEP-503 compliant"));

    let store = SqliteStore::open_read_only(&ctx.db_path).unwrap();
    let urls: Vec<String> = store
        .index_urls()
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        urls,
        vec![
            "https://pypi.org/simple".to_string(),
            format!("{}/index/fedora/simple", server.url()),
        ]
    );
}

#[test]
fn test_dry_run_does_not_touch_the_store() {
    let mut server = Server::new();
    let _root = server
        .mock("GET", "/index/")
        .with_status(200)
        .with_body(table(&["fedora/"]))
        .create();
    let _fedora = server
        .mock("GET", "/index/fedora/")
        .with_status(200)
        .with_body(table(&["simple/"]))
        .create();

    let ctx = TestContext::new();
    let base = format!("{}/index/", server.url());
    let output = ctx.run(&[
        "--dry-run",
        "--initialize-schema",
        "--register-indexes",
        "--index-base-url",
        &base,
    ]);
    assert!(output.status.success());
    assert!(!ctx.db_path.exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("would register index"));
}

#[test]
fn test_solving_without_registered_indexes_fails() {
    let ctx = TestContext::new();
    ctx.seed(&[]);
    let output = ctx.run(&[
        "--solve-core-packages",
        "--scheduler-url",
        "http://127.0.0.1:9",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No Python package indexes registered"));
}

#[test]
fn test_solving_requires_scheduler_url() {
    let ctx = TestContext::new();
    let output = ctx.run(&["--solve-core-packages"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("scheduler URL is required"));
}

#[test]
fn test_solve_core_packages() {
    let mut server = Server::new();
    let _pip = server
        .mock("GET", "/simple/pip/")
        .with_status(200)
        .with_body(
            r#"<a href="/f/pip-18.1.tar.gz">pip-18.1.tar.gz</a>
<a href="/f/pip-19.0-py2.py3-none-any.whl">pip-19.0-py2.py3-none-any.whl</a>"#,
        )
        .create();
    let _setuptools = server
        .mock("GET", "/simple/setuptools/")
        .with_status(404)
        .create();
    let _wheel = server
        .mock("GET", "/simple/wheel/")
        .with_status(200)
        .with_body(r#"<a href="/f/wheel-0.33.1.tar.gz">wheel-0.33.1.tar.gz</a>"#)
        .create();
    let solvers = server
        .mock("POST", "/api/v1/solvers")
        .match_body(Matcher::PartialJsonString(format!(
            r#"{{"indexes": ["{}/simple"], "output": "http://results/api/v1/solver-result"}}"#,
            server.url()
        )))
        .with_status(202)
        .with_header("content-type", "application/json")
        .with_body(r#"{"scheduled": ["solver-1"]}"#)
        .expect(3)
        .create();

    let ctx = TestContext::new();
    ctx.seed(&[format!("{}/simple", server.url())]);
    let output = ctx.run(&[
        "--solve-core-packages",
        "--scheduler-url",
        &server.url(),
        "--result-api",
        "http://results",
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    solvers.assert();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to obtain versions of setuptools"));
    assert!(stderr.contains("Scheduled 3 solver jobs"));
}

#[test]
fn test_dry_run_solve_schedules_nothing() {
    let mut server = Server::new();
    let _ds = server
        .mock("GET", Matcher::Regex(r"^/simple/[a-z]+/$".to_string()))
        .with_status(200)
        .with_body(r#"<a href="/f/numpy-1.16.0.tar.gz">numpy-1.16.0.tar.gz</a>"#)
        .create();
    let solvers = server
        .mock("POST", "/api/v1/solvers")
        .expect(0)
        .create();

    let ctx = TestContext::new();
    ctx.seed(&[format!("{}/simple", server.url())]);
    let list = ctx.temp_dir.path().join("ds.txt");
    std::fs::write(&list, "numpy\n").unwrap();

    let output = ctx.run(&[
        "--dry-run",
        "--solve-data-science-packages",
        "--data-science-packages-file",
        list.to_str().unwrap(),
        "--scheduler-url",
        &server.url(),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    solvers.assert();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("would schedule solver for numpy==1.16.0"));
}
