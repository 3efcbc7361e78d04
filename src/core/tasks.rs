//! The task catalog.
//!
//! Each task is an ordered list of steps against one [`Session`]; the first
//! failing command aborts the task.

use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::command::Cmd;
use crate::db;
use crate::error::{Error, Result};
use crate::session::Session;
use crate::utils::base_path::{join_remote_path, remote_basename};
use crate::utils::template::{self, TemplateVars};
use crate::utils::validation;

pub const DEFAULT_REQUIREMENTS: &str = "production";
pub const DEFAULT_STATIC_OWNER: &str = "www-data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    TouchWsgiReload,
    ReloadProxy,
    RestartProcessSupervisor,
    RunTests,
    InitialSetup,
    ListPackages,
    InstallRequirements { environment: String },
    UpdateTaskQueueConfig,
    MigrateDatabase,
    PullLatest,
    InstallNodeDeps,
    InstallFrontendDeps,
    RunFrontendBuild,
    CollectStaticAssets,
    FixPermissions { user: String, group: String },
    CleanBytecode,
    ProxyConfigtest,
    Authorize { ip: String },
    BuildDocs,
    SqlDump { dest_dir: PathBuf },
    SqlRestore { dir: PathBuf },
}

impl Task {
    /// `install-requirements`; `None` selects the production requirements.
    pub fn install_requirements(environment: Option<&str>) -> Result<Self> {
        let environment = environment.unwrap_or(DEFAULT_REQUIREMENTS);
        let environment = validation::require_file_stem(environment, "environment")?;
        Ok(Task::InstallRequirements {
            environment: environment.to_string(),
        })
    }

    /// `fix-permissions`; the group defaults to the user.
    pub fn fix_permissions(user: Option<&str>, group: Option<&str>) -> Result<Self> {
        let user = validation::require_account_name(user.unwrap_or(DEFAULT_STATIC_OWNER), "user")?;
        let group = match group.filter(|g| !g.trim().is_empty()) {
            Some(group) => validation::require_account_name(group, "group")?,
            None => user,
        };
        Ok(Task::FixPermissions {
            user: user.to_string(),
            group: group.to_string(),
        })
    }

    pub fn authorize(ip: &str) -> Result<Self> {
        let ip = validation::require_ip(ip, "ip")?;
        Ok(Task::Authorize { ip: ip.to_string() })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Task::TouchWsgiReload => "touch-wsgi-reload",
            Task::ReloadProxy => "reload-proxy",
            Task::RestartProcessSupervisor => "restart-process-supervisor",
            Task::RunTests => "run-tests",
            Task::InitialSetup => "initial-setup",
            Task::ListPackages => "list-packages",
            Task::InstallRequirements { .. } => "install-requirements",
            Task::UpdateTaskQueueConfig => "update-task-queue-config",
            Task::MigrateDatabase => "migrate-database",
            Task::PullLatest => "pull-latest",
            Task::InstallNodeDeps => "install-node-deps",
            Task::InstallFrontendDeps => "install-frontend-deps",
            Task::RunFrontendBuild => "run-frontend-build",
            Task::CollectStaticAssets => "collect-static-assets",
            Task::FixPermissions { .. } => "fix-permissions",
            Task::CleanBytecode => "clean-bytecode",
            Task::ProxyConfigtest => "proxy-configtest",
            Task::Authorize { .. } => "authorize",
            Task::BuildDocs => "build-docs",
            Task::SqlDump { .. } => "sql-dump",
            Task::SqlRestore { .. } => "sql-restore",
        }
    }

    /// Run the task. Tasks that produce a result (dump, restore) return it.
    pub fn run(&self, s: &mut Session) -> Result<Option<Value>> {
        match self {
            Task::TouchWsgiReload => touch_wsgi(s)?,
            Task::ReloadProxy => reload_proxy(s)?,
            Task::RestartProcessSupervisor => restart_supervisor(s)?,
            Task::RunTests => run_tests(s)?,
            Task::InitialSetup => initial_setup(s)?,
            Task::ListPackages => list_packages(s)?,
            Task::InstallRequirements { environment } => install_requirements(s, environment)?,
            Task::UpdateTaskQueueConfig => return update_task_queue_config(s).and_then(to_data),
            Task::MigrateDatabase => migrate(s)?,
            Task::PullLatest => pull(s)?,
            Task::InstallNodeDeps => install_node_deps(s)?,
            Task::InstallFrontendDeps => install_frontend_deps(s)?,
            Task::RunFrontendBuild => run_frontend_build(s)?,
            Task::CollectStaticAssets => collect_static(s)?,
            Task::FixPermissions { user, group } => fix_permissions(s, user, group)?,
            Task::CleanBytecode => clean(s)?,
            Task::ProxyConfigtest => proxy_configtest(s)?,
            Task::Authorize { ip } => authorize(s, ip)?,
            Task::BuildDocs => build_docs(s)?,
            Task::SqlDump { dest_dir } => return db::sql_dump(s, dest_dir).and_then(to_data),
            Task::SqlRestore { dir } => return db::sql_restore(s, dir).and_then(to_data),
        }
        Ok(None)
    }
}

fn to_data<T: Serialize>(value: T) -> Result<Option<Value>> {
    serde_json::to_value(value)
        .map(Some)
        .map_err(|e| Error::internal_json(e.to_string(), Some("serialize task result".to_string())))
}

// ============================================================================
// Catalog metadata
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<&'static str>,
    pub summary: &'static str,
    pub invocable: bool,
    pub composite: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<&'static str>,
}

const fn info(
    name: &'static str,
    alias: Option<&'static str>,
    summary: &'static str,
    invocable: bool,
) -> TaskInfo {
    TaskInfo {
        name,
        alias,
        summary,
        invocable,
        composite: false,
        steps: Vec::new(),
    }
}

pub fn catalog() -> Vec<TaskInfo> {
    let mut tasks = vec![
        info(
            "touch-wsgi-reload",
            Some("touch-wsgi"),
            "Touch the wsgi file to trigger an application reload",
            true,
        ),
        info("reload-proxy", Some("nginx-reload"), "Reload the reverse proxy", true),
        info(
            "restart-process-supervisor",
            Some("supervisor-restart"),
            "Restart the process supervisor",
            true,
        ),
        info("run-tests", Some("test"), "Run the accounts test suite", true),
        info(
            "initial-setup",
            None,
            "Create the install root, virtualenv and source checkout",
            true,
        ),
        info("list-packages", Some("pip-list"), "List installed Python packages", true),
        info(
            "install-requirements",
            Some("requirements"),
            "Install Python requirements for an environment",
            true,
        ),
        info(
            "update-task-queue-config",
            Some("update-celery"),
            "Render and install the Celery supervisor config",
            true,
        ),
        info("migrate-database", Some("migrate"), "Run database migrations", true),
        info("pull-latest", Some("pull"), "Check out the deploy branch and pull", true),
        info("install-node-deps", Some("npm"), "Install bower and the npm dependencies", true),
        info("install-frontend-deps", Some("bower"), "Install frontend assets with bower", false),
        info("run-frontend-build", Some("grunt"), "Build frontend assets with grunt", false),
        info(
            "collect-static-assets",
            Some("collect-static"),
            "Collect static files into the serving directory",
            true,
        ),
        info(
            "fix-permissions",
            Some("fix-perms"),
            "Fix ownership and group write on static and media",
            true,
        ),
        info("clean-bytecode", Some("clean"), "Remove compiled Python bytecode", true),
        info("proxy-configtest", Some("configtest"), "Check the reverse proxy configuration", true),
        info("authorize", None, "Authorize an IP address in the application", true),
        info("build-docs", Some("docs"), "Build the client and the documentation", false),
        info("sql-dump", None, "Dump, compress and download the database", true),
        info("sql-restore", None, "Restore a downloaded dump into the local database", true),
    ];

    for composite in [
        crate::pipeline::Composite::Deploy,
        crate::pipeline::Composite::PythonFix,
    ] {
        tasks.push(TaskInfo {
            name: composite.name(),
            alias: None,
            summary: composite.summary(),
            invocable: true,
            composite: true,
            steps: composite.step_names(),
        });
    }

    tasks
}

// ============================================================================
// Task bodies
// ============================================================================

fn code_root(s: &Session) -> String {
    s.record().code_root.clone()
}

fn manage_py(command: &str) -> Cmd {
    Cmd::new("./manage.py").arg(command)
}

pub fn touch_wsgi(s: &mut Session) -> Result<()> {
    let conf_dir = join_remote_path(&s.record().code_root, "config");
    s.cd(&conf_dir, |s| {
        s.run(Cmd::new("touch").arg("lutrisweb.wsgi"))?;
        Ok(())
    })
}

pub fn reload_proxy(s: &mut Session) -> Result<()> {
    let service = s.config().services.proxy.clone();
    s.sudo(Cmd::new("service").args([service.as_str(), "reload"]))?;
    Ok(())
}

pub fn restart_supervisor(s: &mut Session) -> Result<()> {
    let service = s.config().services.supervisor.clone();
    s.sudo(Cmd::new("service").args([service.as_str(), "restart"]))?;
    Ok(())
}

pub fn proxy_configtest(s: &mut Session) -> Result<()> {
    let service = s.config().services.proxy.clone();
    s.sudo(Cmd::new("service").args([service.as_str(), "configtest"]))?;
    Ok(())
}

pub fn run_tests(s: &mut Session) -> Result<()> {
    s.cd(&code_root(s), |s| {
        s.activated(|s| {
            s.run(Cmd::new("python").args(["manage.py", "test", "accounts"]))?;
            Ok(())
        })
    })
}

pub fn initial_setup(s: &mut Session) -> Result<()> {
    let root = s.record().root.clone();
    let domain = s.record().domain.clone();
    let repository = s.config().repository.clone();
    let owner = format!("{0}:{0}", s.user());

    s.sudo(Cmd::new("mkdir").args(["-p", root.as_str()]))?;
    s.sudo(Cmd::new("chown").args([owner.as_str(), root.as_str()]))?;
    s.sudo(Cmd::new("apt").args(["install", "-y", "python3-venv"]))?;
    s.cd(&root, |s| {
        s.run(Cmd::new("python3").args(["-m", "venv", "."]))?;
        s.run(Cmd::new("git").args(["clone", repository.as_str(), domain.as_str()]))?;
        Ok(())
    })
}

pub fn list_packages(s: &mut Session) -> Result<()> {
    s.cd(&code_root(s), |s| {
        s.activated(|s| {
            s.run(Cmd::new("pip").arg("list"))?;
            Ok(())
        })
    })
}

pub fn install_requirements(s: &mut Session, environment: &str) -> Result<()> {
    let requirements = format!("config/requirements/{}.pip", environment);
    s.cd(&code_root(s), |s| {
        s.activated(|s| {
            s.run(Cmd::new("pip").args(["install", "-U", "pip"]))?;
            s.run(Cmd::new("pip").args(["install", "-U", "wheel"]))?;
            s.run(Cmd::new("pip").args([
                "install",
                "-r",
                requirements.as_str(),
                "--exists-action=s",
            ]))?;
            Ok(())
        })
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQueueConfigResult {
    pub template: String,
    pub staging_file: String,
    pub installed_path: String,
}

/// Resolve the task-queue template path against the local project root.
pub fn task_queue_template_path(s: &Session) -> PathBuf {
    let template = shellexpand::tilde(&s.config().task_queue.template).to_string();
    let path = Path::new(&template);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        s.local_root().join(path)
    }
}

pub fn update_task_queue_config(s: &mut Session) -> Result<TaskQueueConfigResult> {
    let record = s.record();
    let queue = s.config().task_queue.clone();
    let template_path = task_queue_template_path(s);

    if !template_path.is_file() {
        return Err(Error::template_not_found(template_path.display().to_string()));
    }

    let raw = fs::read_to_string(&template_path).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("read {}", template_path.display())))
    })?;
    if !template::is_present(&raw, TemplateVars::DOMAIN) {
        log_status!("render", "{} has no %DOMAIN% placeholder", template_path.display());
    }
    let rendered = template::render(
        &raw,
        &[
            (TemplateVars::ROOT, record.root.as_str()),
            (TemplateVars::DOMAIN, record.domain.as_str()),
        ],
    );

    let staging = PathBuf::from(&queue.staging_file);
    fs::write(&staging, rendered).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("write {}", staging.display())))
    })?;
    log_status!("render", "{} -> {}", template_path.display(), staging.display());

    let file_name = remote_basename(&queue.template);
    let uploaded = join_remote_path(&record.root, file_name);
    let installed = join_remote_path(&queue.conf_dir, &format!("{}-celery.conf", record.domain));

    s.put(&staging, &uploaded)?;
    s.sudo(Cmd::new("mv").args([uploaded.as_str(), installed.as_str()]))?;

    Ok(TaskQueueConfigResult {
        template: template_path.display().to_string(),
        staging_file: staging.display().to_string(),
        installed_path: installed,
    })
}

pub fn migrate(s: &mut Session) -> Result<()> {
    s.cd(&code_root(s), |s| {
        s.activated(|s| {
            s.run(manage_py("migrate"))?;
            Ok(())
        })
    })
}

pub fn pull(s: &mut Session) -> Result<()> {
    let branch = s.record().git_branch.clone();
    s.cd(&code_root(s), |s| {
        let checkout = Cmd::new("git").arg("checkout");
        // Local profile has no branch: a bare checkout keeps the current one.
        let checkout = if branch.is_empty() {
            checkout
        } else {
            checkout.arg(branch.as_str())
        };
        s.run(checkout)?;
        s.run(Cmd::new("git").arg("pull"))?;
        s.run(Cmd::new("git").args(["log", "-n", "10"]))?;
        Ok(())
    })
}

pub fn install_node_deps(s: &mut Session) -> Result<()> {
    s.cd(&code_root(s), |s| {
        s.run(Cmd::new("npm").args(["install", "-U", "bower"]))?;
        s.run(Cmd::new("npm").arg("install"))?;
        Ok(())
    })
}

pub fn install_frontend_deps(s: &mut Session) -> Result<()> {
    s.cd(&code_root(s), |s| {
        s.run(Cmd::new("bower").arg("install"))?;
        Ok(())
    })
}

pub fn run_frontend_build(s: &mut Session) -> Result<()> {
    s.cd(&code_root(s), |s| {
        s.run(Cmd::new("grunt"))?;
        Ok(())
    })
}

pub fn collect_static(s: &mut Session) -> Result<()> {
    s.cd(&code_root(s), |s| {
        s.activated(|s| {
            s.run(manage_py("collectstatic").arg("--noinput"))?;
            Ok(())
        })
    })
}

pub fn fix_permissions(s: &mut Session, user: &str, group: &str) -> Result<()> {
    let owner = format!("{}:{}", user, group);
    s.cd(&code_root(s), |s| {
        for dir in ["static", "media"] {
            s.sudo(Cmd::new("chown").args(["-R", owner.as_str(), dir]))?;
            s.sudo(Cmd::new("chmod").args(["-R", "ug+w", dir]))?;
        }
        Ok(())
    })
}

pub fn clean(s: &mut Session) -> Result<()> {
    s.cd(&code_root(s), |s| {
        s.run(Cmd::new("py3clean").arg("."))?;
        Ok(())
    })
}

pub fn authorize(s: &mut Session, ip: &str) -> Result<()> {
    s.cd(&code_root(s), |s| {
        s.activated(|s| {
            s.run(manage_py("authorize").arg(ip))?;
            Ok(())
        })
    })
}

pub fn build_docs(s: &mut Session) -> Result<()> {
    s.cd(&code_root(s), |s| {
        s.run(Cmd::new("make").arg("client"))?;
        s.activated(|s| {
            s.run(Cmd::new("make").arg("docs"))?;
            Ok(())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::DeployConfig;
    use crate::environment::{EnvConfig, Environment};
    use crate::test_support::RecordingTransport;

    const ACTIVATE: &str = concat!(
        "export DJANGO_SETTINGS_MODULE=lutrisweb.settings.production && ",
        ". /srv/lutris/bin/envvars && . /srv/lutris/bin/activate"
    );

    fn production() -> EnvConfig {
        EnvConfig {
            root: "/srv/lutris".to_string(),
            code_root: "/srv/lutris/lutris.net".to_string(),
            domain: "lutris.net".to_string(),
            git_branch: "master".to_string(),
            env: Environment::Production,
        }
    }

    fn run_task(task: Task, record: &EnvConfig) -> Vec<String> {
        let config = DeployConfig::default();
        let transport = RecordingTransport::new();
        let mut session = Session::new(record, &config, &transport);
        task.run(&mut session).unwrap();
        transport.commands()
    }

    #[test]
    fn touch_wsgi_runs_in_config_dir() {
        assert_eq!(
            run_task(Task::TouchWsgiReload, &production()),
            vec!["cd /srv/lutris/lutris.net/config && touch lutrisweb.wsgi"]
        );
    }

    #[test]
    fn service_tasks_are_elevated() {
        assert_eq!(run_task(Task::ReloadProxy, &production()), vec!["sudo service nginx reload"]);
        assert_eq!(
            run_task(Task::RestartProcessSupervisor, &production()),
            vec!["sudo service supervisor restart"]
        );
        assert_eq!(
            run_task(Task::ProxyConfigtest, &production()),
            vec!["sudo service nginx configtest"]
        );
    }

    #[test]
    fn install_requirements_defaults_to_production() {
        let task = Task::install_requirements(None).unwrap();
        assert_eq!(
            task,
            Task::InstallRequirements {
                environment: "production".to_string()
            }
        );

        let commands = run_task(task, &production());
        assert_eq!(commands.len(), 3);
        assert_eq!(
            commands[2],
            format!(
                "cd /srv/lutris/lutris.net && {} && {}",
                ACTIVATE, "pip install -r config/requirements/production.pip --exists-action=s"
            )
        );
    }

    #[test]
    fn install_requirements_rejects_path_segments() {
        assert!(Task::install_requirements(Some("../secrets")).is_err());
    }

    #[test]
    fn fix_permissions_group_defaults_to_user() {
        assert_eq!(
            Task::fix_permissions(None, None).unwrap(),
            Task::FixPermissions {
                user: "www-data".to_string(),
                group: "www-data".to_string()
            }
        );
        assert_eq!(
            Task::fix_permissions(Some("lutris"), None).unwrap(),
            Task::FixPermissions {
                user: "lutris".to_string(),
                group: "lutris".to_string()
            }
        );
    }

    #[test]
    fn fix_permissions_commands() {
        let task = Task::fix_permissions(Some("lutris"), Some("www-data")).unwrap();
        assert_eq!(
            run_task(task, &production()),
            vec![
                "cd /srv/lutris/lutris.net && sudo chown -R lutris:www-data static",
                "cd /srv/lutris/lutris.net && sudo chmod -R ug+w static",
                "cd /srv/lutris/lutris.net && sudo chown -R lutris:www-data media",
                "cd /srv/lutris/lutris.net && sudo chmod -R ug+w media",
            ]
        );
    }

    #[test]
    fn authorize_validates_ip() {
        assert!(Task::authorize("10.0.0.1").is_ok());
        assert!(Task::authorize("10.0.0.1 && reboot").is_err());

        let commands = run_task(Task::authorize("10.0.0.1").unwrap(), &production());
        assert_eq!(
            commands,
            vec![format!(
                "cd /srv/lutris/lutris.net && {} && ./manage.py authorize 10.0.0.1",
                ACTIVATE
            )]
        );
    }

    #[test]
    fn pull_checks_out_branch() {
        assert_eq!(
            run_task(Task::PullLatest, &production()),
            vec![
                "cd /srv/lutris/lutris.net && git checkout master",
                "cd /srv/lutris/lutris.net && git pull",
                "cd /srv/lutris/lutris.net && git log -n 10",
            ]
        );
    }

    #[test]
    fn pull_without_branch_keeps_current_checkout() {
        let record = EnvConfig {
            root: "/home/dev/website".to_string(),
            code_root: "/home/dev/website".to_string(),
            domain: "localhost".to_string(),
            git_branch: String::new(),
            env: Environment::Local,
        };
        let commands = run_task(Task::PullLatest, &record);
        assert_eq!(commands[0], "cd /home/dev/website && git checkout");
    }

    #[test]
    fn initial_setup_sequence() {
        assert_eq!(
            run_task(Task::InitialSetup, &production()),
            vec![
                "sudo mkdir -p /srv/lutris",
                "sudo chown deploy:deploy /srv/lutris",
                "sudo apt install -y python3-venv",
                "cd /srv/lutris && python3 -m venv .",
                "cd /srv/lutris && git clone git@github.com:lutris/website.git lutris.net",
            ]
        );
    }

    #[test]
    fn build_docs_activates_only_for_docs() {
        let commands = run_task(Task::BuildDocs, &production());
        assert_eq!(commands[0], "cd /srv/lutris/lutris.net && make client");
        assert_eq!(commands[1], format!("cd /srv/lutris/lutris.net && {} && make docs", ACTIVATE));
    }

    #[test]
    fn run_tests_targets_accounts_app() {
        assert_eq!(
            run_task(Task::RunTests, &production()),
            vec![format!(
                "cd /srv/lutris/lutris.net && {} && python manage.py test accounts",
                ACTIVATE
            )]
        );
    }

    #[test]
    fn list_packages_runs_activated() {
        assert_eq!(
            run_task(Task::ListPackages, &production()),
            vec![format!("cd /srv/lutris/lutris.net && {} && pip list", ACTIVATE)]
        );
    }

    #[test]
    fn clean_bytecode_runs_in_code_root() {
        assert_eq!(
            run_task(Task::CleanBytecode, &production()),
            vec!["cd /srv/lutris/lutris.net && py3clean ."]
        );
    }

    #[test]
    fn install_node_deps_installs_bower_first() {
        assert_eq!(
            run_task(Task::InstallNodeDeps, &production()),
            vec![
                "cd /srv/lutris/lutris.net && npm install -U bower",
                "cd /srv/lutris/lutris.net && npm install",
            ]
        );
    }

    #[test]
    fn collect_static_is_non_interactive() {
        assert_eq!(
            run_task(Task::CollectStaticAssets, &production()),
            vec![format!(
                "cd /srv/lutris/lutris.net && {} && ./manage.py collectstatic --noinput",
                ACTIVATE
            )]
        );
    }

    #[test]
    fn migrate_runs_activated() {
        assert_eq!(
            run_task(Task::MigrateDatabase, &production()),
            vec![format!("cd /srv/lutris/lutris.net && {} && ./manage.py migrate", ACTIVATE)]
        );
    }

    #[test]
    fn unserializable_result_is_an_internal_error() {
        struct Unserializable;

        impl Serialize for Unserializable {
            fn serialize<S>(&self, _: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                Err(serde::ser::Error::custom("not representable"))
            }
        }

        let err = to_data(Unserializable).unwrap_err();
        assert_eq!(err.code.as_str(), "internal.json_error");
        assert_eq!(to_data("ok").unwrap(), Some(Value::String("ok".to_string())));
    }

    #[test]
    fn failing_step_aborts_task() {
        let record = production();
        let config = DeployConfig::default();
        let transport = RecordingTransport::failing_on("-U wheel");
        let mut session = Session::new(&record, &config, &transport);

        let err = Task::install_requirements(None)
            .unwrap()
            .run(&mut session)
            .unwrap_err();

        assert_eq!(err.code.as_str(), "remote.command_failed");
        assert_eq!(transport.commands().len(), 2);
    }

    #[test]
    fn update_task_queue_config_renders_and_installs() {
        let project = tempfile::tempdir().unwrap();
        fs::create_dir_all(project.path().join("config")).unwrap();
        fs::write(
            project.path().join("config/lutrisweb-celery.conf"),
            "[program:%DOMAIN%-celery]\ndirectory=%ROOT%/%DOMAIN%\n",
        )
        .unwrap();
        let staging = project.path().join("staged.conf");

        let record = production();
        let mut config = DeployConfig::default();
        config.task_queue.staging_file = staging.display().to_string();
        let transport = RecordingTransport::new();
        let mut session =
            Session::new(&record, &config, &transport).with_local_root(project.path());

        let result = update_task_queue_config(&mut session).unwrap();

        assert_eq!(
            fs::read_to_string(&staging).unwrap(),
            "[program:lutris.net-celery]\ndirectory=/srv/lutris/lutris.net\n"
        );
        assert_eq!(result.installed_path, "/etc/supervisor/conf.d/lutris.net-celery.conf");
        assert_eq!(
            transport.commands(),
            vec![
                format!("put {} -> /srv/lutris/lutrisweb-celery.conf", staging.display()),
                concat!(
                    "sudo mv /srv/lutris/lutrisweb-celery.conf ",
                    "/etc/supervisor/conf.d/lutris.net-celery.conf"
                )
                .to_string(),
            ]
        );
    }

    #[test]
    fn update_task_queue_config_requires_template() {
        let project = tempfile::tempdir().unwrap();
        let record = production();
        let config = DeployConfig::default();
        let transport = RecordingTransport::new();
        let mut session =
            Session::new(&record, &config, &transport).with_local_root(project.path());

        let err = update_task_queue_config(&mut session).unwrap_err();
        assert_eq!(err.code.as_str(), "template.not_found");
        assert!(transport.commands().is_empty());
    }

    #[test]
    fn catalog_marks_internal_helpers() {
        let catalog = catalog();
        let internal: Vec<_> =
            catalog.iter().filter(|t| !t.invocable).map(|t| t.name).collect();
        assert_eq!(internal, vec!["install-frontend-deps", "run-frontend-build", "build-docs"]);

        let deploy = catalog.iter().find(|t| t.name == "deploy").unwrap();
        assert_eq!(deploy.steps.len(), 10);
    }
}
