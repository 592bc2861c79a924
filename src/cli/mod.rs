use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Send one prompt and print the reply
    Ask {
        /// Prompt text; multiple words are joined with spaces
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
    },

    /// Interactive prompt loop reading from stdin
    Chat,

    /// Show the configured fallback chain
    Models,
}
