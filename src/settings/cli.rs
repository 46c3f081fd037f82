use super::Parser;
use clap::Subcommand;

#[derive(Parser, Debug)]
#[command(name = "squadhours", about = "Squad hours tracking API")]
pub struct Cli {
    #[arg(long)]
    pub settings: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API (default).
    Serve,
    /// Create a login account.
    CreateUser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_optional() {
        let cli = Cli::try_parse_from(["squadhours"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.settings.is_none());
    }

    #[test]
    fn create_user_takes_named_arguments() {
        let cli = Cli::try_parse_from([
            "squadhours",
            "--settings",
            "settings/test.toml",
            "create-user",
            "--email",
            "ann@example.com",
            "--name",
            "Ann",
            "--password",
            "secret1",
        ])
        .unwrap();

        assert_eq!(cli.settings.as_deref(), Some("settings/test.toml"));
        match cli.command {
            Some(Command::CreateUser { email, name, .. }) => {
                assert_eq!(email, "ann@example.com");
                assert_eq!(name, "Ann");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
