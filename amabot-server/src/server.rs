// File: amabot-server/src/server.rs

use std::sync::Arc;

use tracing::{debug, error, info};

use amabot_core::config::BotConfig;
use amabot_core::platforms::discord::DiscordPlatform;
use amabot_core::platforms::PlatformIntegration;
use amabot_core::Error;

use crate::context::ServerContext;

pub async fn run_server(config: BotConfig) -> Result<(), Error> {
    // 1) Connect to Discord; an invalid token ends the process here.
    let mut discord = DiscordPlatform::new(config.discord_token.clone());
    discord.connect().await?;
    let discord = Arc::new(discord);

    // 2) History store, completion client, relay.
    let ctx = ServerContext::new(&config, discord.clone()).await?;

    // 3) One task per inbound message until Ctrl-C.
    info!("Press Ctrl+C to exit");
    loop {
        tokio::select! {
            event = discord.next_message_event() => {
                let Some(inbound) = event else {
                    error!("Discord event stream closed; shutting down.");
                    break;
                };
                let relay = ctx.relay.clone();
                tokio::spawn(async move {
                    let turn = relay.handle_message(&inbound).await;
                    debug!("Message {} in channel {} => {:?}", inbound.id, inbound.channel_id, turn.outcome);
                });
            }
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    error!("Failed to listen for Ctrl-C: {:?}", e);
                }
                info!("Ctrl-C detected; shutting down...");
                break;
            }
        }
    }

    discord.disconnect().await?;
    if let Some(db) = ctx.db {
        db.pool().close().await;
    }
    info!("Server shutdown complete.");
    Ok(())
}
