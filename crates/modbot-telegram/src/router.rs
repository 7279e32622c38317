use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use modbot_core::{
    config::Config, messaging::port::MessagingPort, service::ModerationService,
    store::ProposalStore,
};

use crate::{handlers, TelegramMessenger};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub service: Arc<ModerationService>,
    pub messenger: Arc<dyn MessagingPort>,
}

pub async fn run_polling(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    if let Ok(me) = bot.get_me().await {
        tracing::info!(username = %me.username(), "moderation relay started");
    }
    tracing::info!(
        moderators = cfg.moderator_ids.len(),
        channel = cfg.channel_id,
        store = %cfg.proposals_file.display(),
        "configuration loaded"
    );

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let store = ProposalStore::new(cfg.proposals_file.clone());
    let service = Arc::new(ModerationService::new(&cfg, store, messenger.clone()));

    let state = Arc::new(AppState { cfg, service, messenger });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
