//! DOM stats sink and screen chrome
//!
//! The simulation never touches the DOM; it raises `stats_dirty` and the host
//! pushes a [`StatsSnapshot`] through here. Element lookups happen once at
//! startup; a missing element just skips its update.

use web_sys::{Document, Element};

use crate::highscores::{HighScores, MAX_HIGH_SCORES};
use crate::sim::StatsSnapshot;

pub struct UiChrome {
    score: Option<Element>,
    level: Option<Element>,
    lives: Option<Element>,
    shield: Option<Element>,
    weapons: Option<Element>,
    start_screen: Option<Element>,
    game_over: Option<Element>,
    final_score: Option<Element>,
    help_screen: Option<Element>,
    highscore_list: Option<Element>,
    shoot_button: Option<Element>,
}

impl UiChrome {
    pub fn new(document: &Document) -> Self {
        let get = |id: &str| document.get_element_by_id(id);
        Self {
            score: get("hud-score"),
            level: get("hud-level"),
            lives: get("hud-lives"),
            shield: get("hud-shield"),
            weapons: get("hud-weapons"),
            start_screen: get("start-screen"),
            game_over: get("game-over"),
            final_score: get("final-score"),
            help_screen: get("help-screen"),
            highscore_list: get("highscore-list"),
            shoot_button: get("shoot-btn"),
        }
    }

    /// Reflect held fire on the on-screen shoot button
    pub fn set_shoot_active(&self, active: bool) {
        if let Some(el) = &self.shoot_button {
            let _ = el.set_attribute("class", if active { "active" } else { "" });
        }
    }

    /// Push a stats snapshot into the HUD
    pub fn update_stats(&self, stats: &StatsSnapshot) {
        if let Some(el) = &self.score {
            el.set_text_content(Some(&format!("{:05}", stats.score)));
        }
        if let Some(el) = &self.level {
            el.set_text_content(Some(&stats.level.to_string()));
        }
        if let Some(el) = &self.lives {
            el.set_text_content(Some(&"\u{25b2} ".repeat(stats.lives.max(0) as usize)));
        }
        if let Some(el) = &self.shield {
            let text = if !stats.has_shield_system {
                "no shield"
            } else if stats.shield_hits > 0 {
                "shield up"
            } else {
                "recharging"
            };
            el.set_text_content(Some(text));
        }
        if let Some(el) = &self.weapons {
            let mut text = format!("x{} shots / {} dmg", stats.shot_count, stats.player_damage);
            if stats.rocket_level > 0 {
                text.push_str(&format!(" / rockets {}", stats.rocket_level));
            }
            if stats.has_pierce {
                text.push_str(" / pierce");
            }
            el.set_text_content(Some(&text));
        }
    }

    /// Hide every overlay (run started or resumed)
    pub fn hide_screens(&self) {
        for el in [&self.start_screen, &self.game_over, &self.help_screen]
            .into_iter()
            .flatten()
        {
            let _ = el.set_attribute("class", "screen hidden");
        }
    }

    pub fn show_start_screen(&self) {
        if let Some(el) = &self.start_screen {
            let _ = el.set_attribute("class", "screen");
        }
    }

    pub fn show_game_over(&self, score: u32, rank: Option<usize>) {
        if let Some(el) = &self.game_over {
            let _ = el.set_attribute("class", "screen");
        }
        if let Some(el) = &self.final_score {
            let text = match rank {
                Some(rank) => format!("{score:05} - high score #{rank}!"),
                None => format!("{score:05}"),
            };
            el.set_text_content(Some(&text));
        }
    }

    pub fn toggle_help(&self) {
        if let Some(el) = &self.help_screen {
            let hidden = el
                .get_attribute("class")
                .is_some_and(|c| c.contains("hidden"));
            let _ = el.set_attribute(
                "class",
                if hidden { "screen" } else { "screen hidden" },
            );
        }
    }

    /// Render the leaderboard, padded with zero rows to the full length
    pub fn render_high_scores(&self, scores: &HighScores) {
        let Some(list) = &self.highscore_list else {
            return;
        };
        let mut html = String::new();
        for i in 0..MAX_HIGH_SCORES {
            let score = scores.scores.get(i).copied().unwrap_or(0);
            html.push_str(&format!("<li>{:05}</li>", score));
        }
        list.set_inner_html(&html);
    }
}
