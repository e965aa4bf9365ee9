use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "scout")]
#[command(about = "Chat with a hosted model that can search the web, arXiv, and Wikipedia", long_about = None)]
pub struct Args {
    #[arg(
        long = "api-key",
        help = "API key for the hosted model (falls back to GROQ_API_KEY)"
    )]
    pub api_key: Option<String>,

    #[arg(short = 'm', long = "model", help = "Model identifier to use")]
    pub model: Option<String>,

    #[arg(
        long = "api-endpoint",
        help = "Custom API base URL (e.g., http://localhost:11434/v1)"
    )]
    pub api_endpoint: Option<String>,

    #[arg(long = "no-tools", help = "Disable all lookup tools for this run")]
    pub no_tools: bool,

    #[arg(
        long = "max-tool-calls",
        help = "Maximum tool invocations per turn before giving up"
    )]
    pub max_tool_calls: Option<u32>,

    #[arg(
        long = "time-budget",
        help = "Wall-clock budget per turn in seconds (unset: no budget)"
    )]
    pub time_budget: Option<u64>,

    #[arg(short = 'v', long = "verbose", help = "Log request/tool diagnostics to stderr")]
    pub verbose: bool,

    #[arg(help = "Question to ask; with none given, starts an interactive chat")]
    pub question: Vec<String>,
}
