pub mod embed;

use std::time::Instant;

use ::serenity::all::{
    ButtonStyle, ComponentInteraction, ComponentInteractionCollector,
    ComponentInteractionDataKind, CreateActionRow, CreateButton, CreateInteractionResponse,
    CreateInteractionResponseMessage, CreateSelectMenu, CreateSelectMenuKind,
    CreateSelectMenuOption, UserId,
};
use ::serenity::futures::StreamExt;
use tokio::time::{timeout_at, Instant as TokioInstant};
use tracing::{debug, error, info, warn};

use crate::cricket::database::UserProfile;
use crate::cricket::error::RosterError;
use crate::cricket::manager;
use crate::cricket::player::Player;
use crate::cricket::roster::{Roster, SwapSelection};
use crate::cricket::swap::{SessionUpdate, SwapPick, SwapSession};
use crate::{Context, Error};

use embed::{render_subs, render_summary};

const NOT_DEBUTED: &str = "❌ You haven't made your debut yet. Use `cmdebut` to get started.";
const EMPTY_TEAM: &str = "⚠️ Your team is empty. Use `cmdrop` or `cmauction` to get players.";
const FETCH_FAILED: &str = "❌ Failed to fetch your team. Try again later.";
const SAVE_FAILED: &str = "⚠️ Couldn't save your team right now. Try again later.";
const STALE_MENU: &str = "❌ Your squad changed since this menu opened. Run the command again.";

/// Discord caps a select menu at 25 options
const MAX_MENU_OPTIONS: usize = 25;
const MAX_LABEL_LEN: usize = 100;

/// Components on the XI view and its swap menus.
///
/// Custom ids are `{invocation id}:{action}` so concurrent invocations never
/// see each other's presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentAction {
    ViewSubs,
    Swap,
    AutoBuild,
    /// XI menu of the numbered swap session
    SwapXi(u32),
    /// Bench menu of the numbered swap session
    SwapSub(u32),
}

impl ComponentAction {
    pub fn custom_id(&self, invocation: u64) -> String {
        match self {
            ComponentAction::ViewSubs => format!("{}:subs", invocation),
            ComponentAction::Swap => format!("{}:swap", invocation),
            ComponentAction::AutoBuild => format!("{}:autobuild", invocation),
            ComponentAction::SwapXi(n) => format!("{}:swap_xi:{}", invocation, n),
            ComponentAction::SwapSub(n) => format!("{}:swap_sub:{}", invocation, n),
        }
    }

    pub fn parse(custom_id: &str, invocation: u64) -> Option<Self> {
        let rest = custom_id.strip_prefix(&format!("{}:", invocation))?;
        let mut parts = rest.splitn(2, ':');
        let action = parts.next()?;
        let session = parts.next().map(str::parse::<u32>);

        match (action, session) {
            ("subs", None) => Some(ComponentAction::ViewSubs),
            ("swap", None) => Some(ComponentAction::Swap),
            ("autobuild", None) => Some(ComponentAction::AutoBuild),
            ("swap_xi", Some(Ok(n))) => Some(ComponentAction::SwapXi(n)),
            ("swap_sub", Some(Ok(n))) => Some(ComponentAction::SwapSub(n)),
            _ => None,
        }
    }
}

/// View your playing XI and manage subs
#[poise::command(slash_command, prefix_command, aliases("playingxi"))]
pub async fn xi(ctx: Context<'_>) -> Result<(), Error> {
    let user_id = ctx.author().id.get().to_string();

    let profile = match manager::load_roster(&ctx.data().database, &user_id).await {
        Ok(profile) => profile,
        Err(RosterError::UserNotFound(_)) => {
            ctx.say(NOT_DEBUTED).await?;
            return Ok(());
        }
        Err(RosterError::EmptyRoster(_)) => {
            ctx.say(EMPTY_TEAM).await?;
            return Ok(());
        }
        Err(e) => {
            error!("[xi] could not load roster for {}: {}", user_id, e);
            ctx.say(FETCH_FAILED).await?;
            return Ok(());
        }
    };

    if let Err(e) = run_view(ctx, profile).await {
        error!("[xi] error: {:?}", e);
        ctx.say(FETCH_FAILED).await?;
    }

    Ok(())
}

/// Everything the view needs to re-render itself
struct ViewState<'a> {
    ctx: Context<'a>,
    invocation: u64,
    owner: UserId,
    team_name: String,
    requester: String,
    thumbnail: String,
    profile: UserProfile,
}

impl ViewState<'_> {
    fn summary(&self, players: &[Player]) -> ::serenity::all::CreateEmbed {
        render_summary(
            &self.team_name,
            &self.requester,
            players,
            &self.ctx.data().config,
        )
        .into_embed(Some(self.thumbnail.clone()))
    }

    fn current_xi(&self) -> Vec<Player> {
        Roster::new(self.profile.players.clone()).xi().to_vec()
    }

    fn user_id(&self) -> String {
        self.owner.get().to_string()
    }
}

/// Where a parsed press is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Ignore,
    ViewButton,
    SessionPick,
}

/// Deadlines of one XI view and of the swap session attached to it.
///
/// Only the latest session accepts picks; opening another replaces it.
struct ViewClock {
    view_deadline: Instant,
    view_open: bool,
    session: Option<SwapSession>,
    sessions_opened: u32,
}

impl ViewClock {
    fn new(view_deadline: Instant) -> Self {
        Self {
            view_deadline,
            view_open: true,
            session: None,
            sessions_opened: 0,
        }
    }

    fn view_open(&self) -> bool {
        self.view_open
    }

    fn next_session_number(&self) -> u32 {
        self.sessions_opened + 1
    }

    fn open_session(&mut self, session: SwapSession) {
        self.sessions_opened = self.sessions_opened.max(session.number());
        self.session = Some(session);
    }

    fn session_mut(&mut self) -> Option<&mut SwapSession> {
        self.session.as_mut()
    }

    fn finish_session(&mut self) {
        self.session = None;
    }

    /// Returns true only on the call that closes the view
    fn close_view_if_due(&mut self, now: Instant) -> bool {
        if self.view_open && now >= self.view_deadline {
            self.view_open = false;
            return true;
        }
        false
    }

    fn drop_expired_session(&mut self, now: Instant) -> bool {
        if self.session.as_ref().map_or(false, |s| s.is_expired(now)) {
            self.session = None;
            return true;
        }
        false
    }

    /// The nearer live deadline, `None` once nothing can accept a press
    fn next_deadline(&self) -> Option<Instant> {
        let view = self.view_open.then_some(self.view_deadline);
        let session = self.session.as_ref().map(SwapSession::deadline);
        match (view, session) {
            (Some(v), Some(s)) => Some(v.min(s)),
            (v, s) => v.or(s),
        }
    }

    fn route(&self, action: ComponentAction, now: Instant) -> Route {
        match action {
            ComponentAction::SwapXi(n) | ComponentAction::SwapSub(n) => match &self.session {
                Some(s) if s.number() == n && !s.is_expired(now) => Route::SessionPick,
                _ => Route::Ignore,
            },
            _ if self.view_open && now < self.view_deadline => Route::ViewButton,
            _ => Route::Ignore,
        }
    }
}

async fn run_view(ctx: Context<'_>, profile: UserProfile) -> Result<(), Error> {
    let author = ctx.author();
    let mut view = ViewState {
        ctx,
        invocation: ctx.id(),
        owner: author.id,
        team_name: profile
            .team_name
            .clone()
            .unwrap_or_else(|| author.name.clone()),
        requester: author.name.clone(),
        thumbnail: author.face(),
        profile,
    };

    let reply = ctx
        .send(
            poise::CreateReply::default()
                .embed(view.summary(&view.current_xi()))
                .components(vec![view_buttons(view.invocation)]),
        )
        .await?;

    let config = &ctx.data().config;
    let mut clock = ViewClock::new(Instant::now() + config.view_timeout());

    // Registered once for the whole view; presses that arrive while another
    // one is being handled queue up on the stream
    let id_prefix = format!("{}:", view.invocation);
    let mut presses = Box::pin(
        ComponentInteractionCollector::new(ctx.serenity_context())
            .filter(move |press| press.data.custom_id.starts_with(&id_prefix))
            .stream(),
    );

    loop {
        let now = Instant::now();

        if clock.close_view_if_due(now) {
            debug!("[xi] view {} expired", view.invocation);
            let closed = poise::CreateReply::default()
                .embed(view.summary(&view.current_xi()))
                .components(vec![]);
            if let Err(e) = reply.edit(ctx, closed).await {
                warn!("[xi] could not remove buttons: {}", e);
            }
        }

        if clock.drop_expired_session(now) {
            debug!("[xi] swap session expired without a selection");
        }

        let Some(deadline) = clock.next_deadline() else {
            break;
        };

        let press = match timeout_at(TokioInstant::from_std(deadline), presses.next()).await {
            Ok(Some(press)) => press,
            Ok(None) => break,
            Err(_) => continue,
        };

        let Some(action) = ComponentAction::parse(&press.data.custom_id, view.invocation) else {
            continue;
        };

        match clock.route(action, Instant::now()) {
            Route::Ignore => {
                debug!("[xi] ignored {:?} on view {}", action, view.invocation);
                continue;
            }
            Route::ViewButton => {
                if let Err(e) = manager::authorize(view.owner.get(), press.user.id.get()) {
                    debug!("[xi] {} ({})", e, press.user.id);
                    respond(
                        &view,
                        &press,
                        CreateInteractionResponseMessage::new()
                            .content("❌ Not your team.")
                            .ephemeral(true),
                    )
                    .await?;
                    continue;
                }
            }
            Route::SessionPick => {}
        }

        match action {
            ComponentAction::ViewSubs => show_subs(&view, &press).await?,
            ComponentAction::AutoBuild => {
                run_autobuild(&mut view, &press).await?;
                refresh_view(&view, &reply, clock.view_open()).await;
            }
            ComponentAction::Swap => {
                if let Some(opened) = open_swap(&view, &press, clock.next_session_number()).await? {
                    clock.open_session(opened);
                }
            }
            ComponentAction::SwapXi(_) | ComponentAction::SwapSub(_) => {
                let Some(index) = selected_index(&press) else {
                    continue;
                };
                let pick = match action {
                    ComponentAction::SwapXi(_) => SwapPick::Xi(index),
                    _ => SwapPick::Sub(index),
                };
                let Some(active) = clock.session_mut() else {
                    continue;
                };

                match active.select(press.user.id.get(), pick) {
                    Ok(SessionUpdate::Ignored) => {}
                    Ok(SessionUpdate::Pending) => {
                        press
                            .create_response(
                                ctx.serenity_context(),
                                CreateInteractionResponse::Acknowledge,
                            )
                            .await?;
                    }
                    Ok(SessionUpdate::Ready(selection)) => {
                        clock.finish_session();
                        let changed = complete_swap(&mut view, &press, &selection).await?;
                        if changed {
                            refresh_view(&view, &reply, clock.view_open()).await;
                        }
                    }
                    Err(e) => {
                        warn!("[xi] rejected swap pick: {}", e);
                        respond(
                            &view,
                            &press,
                            CreateInteractionResponseMessage::new()
                                .content(STALE_MENU)
                                .ephemeral(true),
                        )
                        .await?;
                    }
                }
            }
        }
    }

    debug!("[xi] view {} closed", view.invocation);
    Ok(())
}

async fn respond(
    view: &ViewState<'_>,
    press: &ComponentInteraction,
    message: CreateInteractionResponseMessage,
) -> Result<(), Error> {
    press
        .create_response(
            view.ctx.serenity_context(),
            CreateInteractionResponse::Message(message),
        )
        .await?;
    Ok(())
}

async fn show_subs(view: &ViewState<'_>, press: &ComponentInteraction) -> Result<(), Error> {
    let roster = Roster::new(view.profile.players.clone());
    let subs = roster.subs();

    let message = if subs.is_empty() {
        CreateInteractionResponseMessage::new().content("❌ No substitutes in your squad.")
    } else {
        CreateInteractionResponseMessage::new().embed(render_subs(subs))
    };

    respond(view, press, message).await
}

async fn run_autobuild(view: &mut ViewState<'_>, press: &ComponentInteraction) -> Result<(), Error> {
    let pool = &view.ctx.data().database;

    match manager::autobuild(pool, &view.user_id()).await {
        Ok((profile, xi)) => {
            view.profile = profile;
            let message = CreateInteractionResponseMessage::new()
                .content("✅ AutoBuild complete! Your top players have been set as XI.")
                .embed(view.summary(&xi));
            respond(view, press, message).await
        }
        Err(e) => {
            error!("[xi] autobuild failed for {}: {}", view.profile.user_id, e);
            let content = if e.is_persistence() {
                SAVE_FAILED
            } else {
                FETCH_FAILED
            };
            respond(
                view,
                press,
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            )
            .await
        }
    }
}

/// Reply with the two swap menus. Returns the new session, or `None` when
/// there is nobody on the bench.
async fn open_swap(
    view: &ViewState<'_>,
    press: &ComponentInteraction,
    number: u32,
) -> Result<Option<SwapSession>, Error> {
    let roster = Roster::new(view.profile.players.clone());
    let (xi, subs) = roster.partition();

    if subs.is_empty() {
        respond(
            view,
            press,
            CreateInteractionResponseMessage::new()
                .content("❌ You have no subs to swap.")
                .ephemeral(true),
        )
        .await?;
        return Ok(None);
    }

    let session = SwapSession::new(
        view.owner.get(),
        number,
        xi,
        subs,
        Instant::now(),
        view.ctx.data().config.swap_timeout(),
    );

    let xi_menu = player_menu(
        ComponentAction::SwapXi(number).custom_id(view.invocation),
        "Select XI player to swap out",
        xi,
        "XI Player",
    );
    let sub_menu = player_menu(
        ComponentAction::SwapSub(number).custom_id(view.invocation),
        "Select sub to swap in",
        subs,
        "Sub",
    );

    respond(
        view,
        press,
        CreateInteractionResponseMessage::new()
            .content("🔄 Choose players to swap:")
            .components(vec![xi_menu, sub_menu])
            .ephemeral(true),
    )
    .await?;

    debug!("[xi] swap session {} opened", number);
    Ok(Some(session))
}

/// Run a finished selection. Returns whether the roster changed.
async fn complete_swap(
    view: &mut ViewState<'_>,
    press: &ComponentInteraction,
    selection: &SwapSelection,
) -> Result<bool, Error> {
    let pool = &view.ctx.data().database;
    let user_id = view.user_id();

    let (content, changed) = match manager::swap(pool, &user_id, selection).await {
        Ok((profile, outcome)) => {
            view.profile = profile;
            (
                format!(
                    "✅ Swapped **{}** with **{}**.",
                    outcome.outgoing, outcome.incoming
                ),
                true,
            )
        }
        Err(e @ (RosterError::StaleSelection | RosterError::IndexOutOfRange { .. })) => {
            info!("[xi] stale swap for {}: {}", user_id, e);
            (STALE_MENU.to_string(), false)
        }
        Err(e) => {
            error!("[xi] swap failed for {}: {}", user_id, e);
            let content = if e.is_persistence() {
                SAVE_FAILED
            } else {
                FETCH_FAILED
            };
            (content.to_string(), false)
        }
    };

    respond(
        view,
        press,
        CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(true),
    )
    .await?;

    Ok(changed)
}

/// Re-render the XI on the original message after a change
async fn refresh_view(view: &ViewState<'_>, reply: &poise::ReplyHandle<'_>, view_open: bool) {
    let components = if view_open {
        vec![view_buttons(view.invocation)]
    } else {
        vec![]
    };
    let updated = poise::CreateReply::default()
        .embed(view.summary(&view.current_xi()))
        .components(components);

    if let Err(e) = reply.edit(view.ctx, updated).await {
        warn!("[xi] could not refresh view: {}", e);
    }
}

fn view_buttons(invocation: u64) -> CreateActionRow {
    CreateActionRow::Buttons(vec![
        CreateButton::new(ComponentAction::ViewSubs.custom_id(invocation))
            .label("📋 View Subs")
            .style(ButtonStyle::Secondary),
        CreateButton::new(ComponentAction::Swap.custom_id(invocation))
            .label("🔄 Swap Players")
            .style(ButtonStyle::Primary),
        CreateButton::new(ComponentAction::AutoBuild.custom_id(invocation))
            .label("⚙️ AutoBuild")
            .style(ButtonStyle::Success),
    ])
}

fn player_menu(
    custom_id: String,
    placeholder: &str,
    players: &[Player],
    fallback: &str,
) -> CreateActionRow {
    let options = players
        .iter()
        .take(MAX_MENU_OPTIONS)
        .enumerate()
        .map(|(idx, p)| CreateSelectMenuOption::new(menu_label(p, fallback, idx), idx.to_string()))
        .collect();

    CreateActionRow::SelectMenu(
        CreateSelectMenu::new(custom_id, CreateSelectMenuKind::String { options })
            .placeholder(placeholder)
            .min_values(1)
            .max_values(1),
    )
}

fn menu_label(player: &Player, fallback: &str, idx: usize) -> String {
    if player.name.is_empty() {
        return format!("{} {}", fallback, idx + 1);
    }
    player.name.chars().take(MAX_LABEL_LEN).collect()
}

fn selected_index(press: &ComponentInteraction) -> Option<usize> {
    match &press.data.kind {
        ComponentInteractionDataKind::StringSelect { values } => {
            values.first().and_then(|v| v.parse::<usize>().ok())
        }
        _ => None,
    }
}
