use std::sync::Arc;

use clap::Subcommand;
use colored::*;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};

use tessera_api::TokenApi;
use tessera_cli::config::Config;
use tessera_core::{ProviderContext, Token};
use tessera_storage::SqliteTokenStore;

#[derive(Subcommand)]
pub enum TokensCommands {
    /// Issue a token for a user
    Create {
        /// Owner of the new token
        #[arg(short, long)]
        user: String,
        /// Policy to issue under (defaults to TESSERA_DEFAULT_POLICY)
        #[arg(short, long)]
        policy: Option<String>,
    },
    /// List a user's tokens
    List {
        #[arg(short, long)]
        user: String,
    },
    /// Show a token
    Show {
        /// Token to show
        id: String,
    },
    /// Delete a token (succeeds whether or not it exists)
    Delete {
        /// Token to delete
        id: String,
    },
}

pub async fn handle_tokens_command(
    command: TokensCommands,
    config: &Config,
) -> anyhow::Result<()> {
    // Token commands always work on the database file; a memory store
    // only lives inside a running server.
    let store = SqliteTokenStore::connect(&config.database_path, 1).await?;
    let api = TokenApi::new(Arc::new(store), config.policies.clone());

    match command {
        TokensCommands::Create { user, policy } => {
            let policy = policy.unwrap_or_else(|| config.default_policy.clone());
            let token = api.create(&ProviderContext::new(user, policy)).await?;

            println!("{} {}", "✓ Issued token".green().bold(), token.token.cyan());
            Ok(())
        }
        TokensCommands::List { user } => {
            let ctx = ProviderContext::new(user.clone(), config.default_policy.clone());
            let tokens = api.list(&ctx).await?;

            if tokens.is_empty() {
                println!("{}", format!("No tokens found for {}", user).yellow());
                return Ok(());
            }

            print_tokens(&tokens);
            Ok(())
        }
        TokensCommands::Show { id } => {
            match api.get(&id).await? {
                Some(token) => print_tokens(std::slice::from_ref(&token)),
                None => println!("{}", "Token not found".yellow()),
            }
            Ok(())
        }
        TokensCommands::Delete { id } => {
            api.delete(&id).await?;
            println!("{}", "✓ Token deleted".green().bold());
            Ok(())
        }
    }
}

fn print_tokens(tokens: &[Token]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec!["Token", "User", "Policy", "Created"]);

    for token in tokens {
        table.add_row(vec![
            token.token.clone(),
            token.user_id.clone(),
            token.policy_name.clone(),
            token.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }

    println!("{table}");
}
