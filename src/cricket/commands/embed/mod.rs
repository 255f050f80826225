use ::serenity::all::{CreateEmbed, CreateEmbedFooter};

use crate::config::BotConfig;
use crate::cricket::player::Player;
use crate::cricket::roster::{categorize_by_role, team_rating, XI_SIZE};

const XI_COLOUR: u32 = 0x1E90FF;
const SUBS_COLOUR: u32 = 0xFFA500;

/// Display-ready Playing XI, independent of Discord's embed builder
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryView {
    pub title: String,
    pub lines: Vec<String>,
    pub footer: String,
    pub colour: u32,
}

impl SummaryView {
    pub fn description(&self) -> String {
        self.lines.join("\n")
    }

    pub fn into_embed(self, thumbnail: Option<String>) -> CreateEmbed {
        let description = self.description();
        let mut embed = CreateEmbed::new()
            .title(self.title)
            .description(description)
            .footer(CreateEmbedFooter::new(self.footer))
            .color(self.colour);

        if let Some(url) = thumbnail {
            embed = embed.thumbnail(url);
        }

        embed
    }
}

/// One roster line: card, name, OVR | BAT | BOWL, flag
pub fn format_player(player: &Player, config: &BotConfig) -> String {
    format!(
        "{} `{}` `{}` | `{}` | `{}` {}",
        player.rarity.icon(),
        player.display_name(),
        player.rating(),
        player.batting,
        player.bowling,
        config.flag_for(&player.country)
    )
}

/// Build the Playing XI view for `players`, grouped by role
pub fn render_summary(
    team_name: &str,
    requester: &str,
    players: &[Player],
    config: &BotConfig,
) -> SummaryView {
    let rating = team_rating(players);

    let mut lines = vec![
        format!("**{}** • **OVR:** `{:.1}`", team_name, rating),
        "`Card | Player | OVR | BAT | BOWL | Country`".to_string(),
    ];

    for (role, group) in categorize_by_role(players) {
        lines.push(format!(
            "\n__**{}**__ {}",
            role.section_label(),
            role.section_icon()
        ));
        lines.extend(group.iter().map(|p| format_player(p, config)));
    }

    SummaryView {
        title: "🏏 Playing XI".to_string(),
        lines,
        footer: format!("{} • Playing XI", requester),
        colour: XI_COLOUR,
    }
}

/// Bench listing, numbered on from the XI
pub fn render_subs(subs: &[Player]) -> CreateEmbed {
    let description = subs
        .iter()
        .enumerate()
        .map(|(idx, p)| format!("**{}.** {}", idx + XI_SIZE + 1, p.display_name()))
        .collect::<Vec<_>>()
        .join("\n");

    CreateEmbed::new()
        .title("📋 Substitutes")
        .description(description)
        .color(SUBS_COLOUR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cricket::player::{test_player, Rarity, Role};

    fn config() -> BotConfig {
        let mut config = BotConfig::default();
        config
            .countries
            .insert("India".to_string(), "🇮🇳".to_string());
        config
    }

    #[test]
    fn test_format_player_line() {
        let mut p = test_player("Bumrah", Role::Bowler, 0);
        p.rarity = Rarity::Legend;
        p.batting = 21;
        p.bowling = 96;
        p.overall = None;

        assert_eq!(
            format_player(&p, &config()),
            "🌟 `Bumrah` `59` | `21` | `96` 🇮🇳"
        );
    }

    #[test]
    fn test_unknown_country_uses_globe() {
        let mut p = test_player("Van der Merwe", Role::AllRounder, 70);
        p.country = "Netherlands".to_string();
        assert!(format_player(&p, &config()).ends_with("🌍"));
    }

    #[test]
    fn test_render_summary_sections() {
        let players = vec![
            test_player("Rohit", Role::Batter, 88),
            test_player("Siraj", Role::Bowler, 80),
            test_player("Kohli", Role::Batter, 90),
        ];

        let view = render_summary("Mumbai Mavericks", "sachin", &players, &config());

        assert_eq!(view.title, "🏏 Playing XI");
        assert_eq!(view.footer, "sachin • Playing XI");
        assert_eq!(view.lines[0], "**Mumbai Mavericks** • **OVR:** `86.0`");
        assert_eq!(view.lines[2], "\n__**Batters**__ 🏏");
        assert!(view.lines[3].contains("`Rohit`"));
        assert!(view.lines[4].contains("`Kohli`"));
        assert_eq!(view.lines[5], "\n__**Bowlers**__ 🔴");
        assert!(view.lines[6].contains("`Siraj`"));
        assert_eq!(view.lines.len(), 7);

        let description = view.description();
        assert!(!description.contains("WK"));
        assert!(!description.contains("All-Rounders"));
    }

    #[test]
    fn test_team_rating_uses_one_decimal() {
        let players = vec![
            test_player("A", Role::Batter, 80),
            test_player("B", Role::Batter, 81),
            test_player("C", Role::WicketKeeper, 81),
        ];
        let view = render_summary("XI", "me", &players, &config());
        assert!(view.lines[0].ends_with("`80.7`"));
        assert!(view.description().contains("__**WK**__ 🧤"));
    }
}
