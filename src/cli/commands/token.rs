use clap::Args;
use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::{utils::output_success, OutputFormat};
use crate::config;
use crate::types::Role;

#[derive(Debug, Args)]
pub struct TokenArgs {
    #[arg(long, help = "Account id written to the token subject")]
    pub user_id: i64,

    #[arg(long, help = "Account username")]
    pub username: String,

    #[arg(long, default_value = "editor", help = "Role: admin, editor or viewer")]
    pub role: Role,
}

pub async fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config::config().security;
    let claims = Claims::new(args.user_id, &args.username, args.role, security.jwt_expiry_hours);
    let token = generate_jwt(&claims, &security.jwt_secret)?;

    match output_format {
        OutputFormat::Json => output_success(
            &output_format,
            "Token generated",
            Some(json!({ "token": token, "expires_at": claims.exp })),
        ),
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
