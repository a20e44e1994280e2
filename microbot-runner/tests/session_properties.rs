//! Property tests for the paper session: whatever the tick stream, the
//! position lifecycle stays consistent.

use proptest::prelude::*;

use microbot_core::{Action, DecisionEngine, Position};
use microbot_runner::config::SessionConfig;
use microbot_runner::session::PaperSession;
use microbot_runner::Tick;

fn arb_ticks() -> impl Strategy<Value = Vec<Tick>> {
    prop::collection::vec((-0.01f64..0.01, 0.0f64..200.0, 0.0f64..200.0), 1..300).prop_map(
        |steps| {
            let mut price = 100.0;
            steps
                .into_iter()
                .map(|(step, bid, ask)| {
                    price *= 1.0 + step;
                    Tick::new(price).with_volumes(bid, ask)
                })
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn entries_and_exits_alternate(ticks in arb_ticks()) {
        let mut session = PaperSession::new(DecisionEngine::default(), SessionConfig::default());
        let mut open = false;
        for tick in &ticks {
            let step = session.on_tick(tick);
            match step.decision.action {
                Action::Buy | Action::Sell => {
                    prop_assert!(!open);
                    open = true;
                }
                Action::Exit => {
                    prop_assert!(open);
                    prop_assert!(step.closed.is_some());
                    open = false;
                }
                Action::Hold => prop_assert!(step.closed.is_none()),
            }
            prop_assert_eq!(open, session.open_position().is_some());
        }

        let a = session.actions();
        prop_assert_eq!(a.exit, session.trades().len());
        prop_assert_eq!(a.buy + a.sell - a.exit, usize::from(open));
        prop_assert_eq!(a.total(), ticks.len());
    }

    #[test]
    fn cooldown_never_exceeds_setting(ticks in arb_ticks(), cycles in 0u32..10) {
        let config = SessionConfig { cooldown_cycles: cycles, ..SessionConfig::default() };
        let mut session = PaperSession::new(DecisionEngine::default(), config);
        for tick in &ticks {
            session.on_tick(tick);
            prop_assert!(session.state().cooldown <= cycles);
        }
    }

    #[test]
    fn trailing_stop_only_rises(ticks in arb_ticks()) {
        let mut session = PaperSession::new(DecisionEngine::default(), SessionConfig::default());
        let mut last_stop: Option<f64> = None;
        for tick in &ticks {
            session.on_tick(tick);
            match &session.state().position {
                Position::Open(open) => {
                    if let (Some(prev), Some(now)) = (last_stop, open.trail_stop) {
                        prop_assert!(now >= prev);
                    }
                    if last_stop.is_some() {
                        prop_assert!(open.trail_stop.is_some());
                    }
                    last_stop = open.trail_stop;
                }
                Position::Flat => last_stop = None,
            }
        }
    }

    #[test]
    fn trade_pnl_sign_matches_side(ticks in arb_ticks()) {
        let mut session = PaperSession::new(DecisionEngine::default(), SessionConfig::default());
        session.run(&ticks);
        for t in session.trades() {
            let raw = (t.exit_price - t.entry_price) * t.side.sign();
            prop_assert!((t.pnl - raw * t.quantity).abs() < 1e-9);
            prop_assert!(t.exit_tick >= t.entry_tick);
        }
    }
}
