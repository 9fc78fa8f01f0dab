use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "dm-cli")]
#[command(about = "DM conversation script agent CLI")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    Validate(ValidateArgs),
    Agent(AgentArgs),
}

#[derive(Debug, Args)]
pub(crate) struct ValidateArgs {
    #[arg(long = "script")]
    pub(crate) script: String,
}

#[derive(Debug, Args)]
pub(crate) struct AgentArgs {
    #[command(subcommand)]
    pub(crate) command: AgentCommand,
}

#[derive(Debug, Subcommand)]
pub(crate) enum AgentCommand {
    Start(StartArgs),
    Say(SayArgs),
}

#[derive(Debug, Args)]
pub(crate) struct StartArgs {
    #[arg(long = "script")]
    pub(crate) script: String,
    #[arg(long = "state-out")]
    pub(crate) state_out: String,
    #[arg(long = "session-id", default_value = "cli")]
    pub(crate) session_id: String,
    #[arg(long = "max-steps")]
    pub(crate) max_steps: Option<u32>,
    /// Seed binding as `name=value`; repeatable.
    #[arg(long = "bind")]
    pub(crate) bind: Vec<String>,
}

#[derive(Debug, Args)]
pub(crate) struct SayArgs {
    #[arg(long = "state-in")]
    pub(crate) state_in: String,
    #[arg(long = "text")]
    pub(crate) text: String,
    #[arg(long = "state-out")]
    pub(crate) state_out: String,
}
