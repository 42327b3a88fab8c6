//! Sign-in commands.
//!
//! Signing in stores the user's identity and access token in the session
//! file and claims every record created while signed out.

use clap::{Args, Subcommand};
use sqlx::SqlitePool;

use fitsync::config::Config;
use fitsync::identity::UserId;
use fitsync::session::Session;
use fitsync::sync::OwnershipMigrator;

#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand)]
enum AuthSubcommand {
    /// Sign in as a user of the remote store
    Login {
        /// User ID issued by the remote store
        user_id: String,

        /// Access token for the remote store
        #[arg(long)]
        token: String,
    },
    /// Sign out (local data is kept)
    Logout,
    /// Show who is signed in
    Status,
}

impl AuthCommand {
    pub async fn run(
        &self,
        config: &Config,
        pool: &SqlitePool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let path = &config.session_path.value;

        match &self.command {
            AuthSubcommand::Login { user_id, token } => {
                let user = UserId::new(user_id.as_str())?;
                if token.trim().is_empty() {
                    return Err("Access token cannot be empty".into());
                }

                let signed_out = Session::load(path)?.is_none();
                Session::new(user.clone(), token.trim()).save(path)?;
                println!("Logged in as {}", user);

                if signed_out {
                    let report = OwnershipMigrator::new(pool.clone()).migrate(&user).await?;
                    if report.total() > 0 {
                        println!("Local data: {}", report);
                    }
                }
                Ok(())
            }

            AuthSubcommand::Logout => {
                if Session::clear(path)? {
                    println!("Logged out. Local data is kept on this device.");
                } else {
                    println!("Not logged in");
                }
                Ok(())
            }

            AuthSubcommand::Status => {
                match Session::load(path)? {
                    Some(session) => {
                        println!("Logged in as {}", session.user_id);
                        println!(
                            "  since: {}",
                            session.signed_in_at.format("%Y-%m-%d %H:%M UTC")
                        );
                    }
                    None => println!("Not logged in"),
                }
                Ok(())
            }
        }
    }
}
