use clap::Subcommand;
use foreplan_core::integrations::keyring_store;

#[derive(Subcommand)]
pub enum AuthAction {
    /// GitHub: login / logout / status
    Github {
        #[command(subcommand)]
        action: AuthOp,
    },
}

#[derive(Subcommand)]
pub enum AuthOp {
    /// Store a personal access token
    Login {
        /// API token
        #[arg(long)]
        token: Option<String>,
    },
    /// Remove the stored token
    Logout,
    /// Check authentication status
    Status,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Github { action: op } => handle_github(op),
    }
}

fn handle_github(op: AuthOp) -> Result<(), Box<dyn std::error::Error>> {
    match op {
        AuthOp::Login { token } => {
            let tok = token.ok_or("--token required for GitHub")?;
            keyring_store::set("github_token", &tok)?;
            println!("GitHub authenticated");
        }
        AuthOp::Logout => {
            keyring_store::delete("github_token")?;
            println!("GitHub disconnected");
        }
        AuthOp::Status => {
            let stored = keyring_store::get("github_token")?;
            println!(
                "{}",
                if stored.is_some() {
                    "authenticated"
                } else {
                    "not authenticated"
                }
            );
        }
    }
    Ok(())
}
