//! Phase transitions.
//!
//! `new_phase` performs the phase-specific setup the controller asks for:
//! schedule generation on entering the regular season, bracket creation and
//! the first playoff day on entering the playoffs, and bookkeeping-only
//! transitions otherwise.

use crate::db::LeagueStore;
use crate::error::Result;
use crate::models::Phase;
use crate::notify::{LogEvent, NotificationSink, UiHint, UpdateTag};
use crate::season;
use crate::season::playoffs;

pub fn new_phase(
    store: &mut LeagueStore,
    sink: &mut dyn NotificationSink,
    phase: Phase,
) -> Result<()> {
    log::info!("Phase transition: {} -> {}", store.attrs().phase.label(), phase.label());

    match phase {
        Phase::Preseason => {
            store.attrs_mut().phase = phase;
        }
        Phase::RegularSeason => {
            store.attrs_mut().phase = phase;
            for tid in store.active_tids() {
                store.team_mut(tid)?.record = Default::default();
            }
            store.set_playoffs(None);
            season::generate_regular_schedule(store)?;
            sink.log_event(LogEvent::info(format!(
                "The season {} regular season is underway.",
                store.attrs().season
            )));
        }
        Phase::AfterTradeDeadline => {
            store.attrs_mut().phase = phase;
            sink.log_event(LogEvent::info("The trade deadline has passed."));
        }
        Phase::Playoffs => {
            store.attrs_mut().phase = phase;
            let bracket = playoffs::init_playoffs(store)?;
            let num_teams = bracket.rounds.first().map_or(0, |r| r.len() * 2);
            store.set_playoffs(Some(bracket));
            playoffs::new_schedule_playoffs_day(store, sink)?;
            sink.log_event(LogEvent::info(format!(
                "The playoffs have begun with {} teams.",
                num_teams
            )));
        }
        Phase::DraftLottery => {
            store.attrs_mut().phase = phase;
            sink.log_event(LogEvent::info(
                "The season is over. On to the draft lottery.",
            ));
        }
    }

    sink.ui_hint(UiHint::RealtimeUpdate { tags: vec![UpdateTag::NewPhase], live: None });
    Ok(())
}
