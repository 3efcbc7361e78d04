use clap::Args;

use lutris_deploy::tasks::Task;

use super::TaskArgs;

#[derive(Args, Debug)]
pub struct InstallRequirementsArgs {
    /// Requirements file stem under config/requirements/ (default: production)
    pub environment: Option<String>,
}

impl TaskArgs for InstallRequirementsArgs {
    fn into_task(self) -> lutris_deploy::Result<Task> {
        Task::install_requirements(self.environment.as_deref())
    }
}

#[derive(Args, Debug)]
pub struct FixPermissionsArgs {
    /// Owner of the static and media trees (default: www-data)
    #[arg(long)]
    pub user: Option<String>,

    /// Group of the static and media trees (default: the user)
    #[arg(long)]
    pub group: Option<String>,
}

impl TaskArgs for FixPermissionsArgs {
    fn into_task(self) -> lutris_deploy::Result<Task> {
        Task::fix_permissions(self.user.as_deref(), self.group.as_deref())
    }
}

#[derive(Args, Debug)]
pub struct AuthorizeArgs {
    /// IPv4 or IPv6 address to authorize
    pub ip: String,
}

impl TaskArgs for AuthorizeArgs {
    fn into_task(self) -> lutris_deploy::Result<Task> {
        Task::authorize(&self.ip)
    }
}
