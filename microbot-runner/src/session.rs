//! Paper session: a reference execution layer around the decision engine.
//!
//! The engine only decides. Per tick the session does the caller's share:
//!
//! 1. Append the price to the rolling window
//! 2. Mark the open position: pnl, time in trade, trailing stop ratchet
//! 3. Ask the engine for a decision
//! 4. Apply it: open at the tick price, close into a `TradeRecord`, or tick
//!    the cooldown down
//!
//! One session per instrument. Sessions share nothing, so different
//! instruments can run on different threads.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use microbot_core::domain::{
    Action, MarketSnapshot, OpenPosition, Position, PositionState, TradeRecord,
};
use microbot_core::{Decision, DecisionEngine};

use crate::config::SessionConfig;
use crate::data_loader::Tick;

/// Result of feeding one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub tick_index: usize,
    pub decision: Decision,
    /// Set when this tick closed a position.
    pub closed: Option<TradeRecord>,
}

/// How often each action was returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCounts {
    pub hold: usize,
    pub buy: usize,
    pub sell: usize,
    pub exit: usize,
}

impl ActionCounts {
    pub fn record(&mut self, action: Action) {
        match action {
            Action::Hold => self.hold += 1,
            Action::Buy => self.buy += 1,
            Action::Sell => self.sell += 1,
            Action::Exit => self.exit += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.hold + self.buy + self.sell + self.exit
    }
}

#[derive(Debug, Clone)]
pub struct PaperSession {
    engine: DecisionEngine,
    config: SessionConfig,
    snapshot: MarketSnapshot,
    state: PositionState,
    window: usize,
    tick_index: usize,
    entry_tick: usize,
    peak_pnl: f64,
    trades: Vec<TradeRecord>,
    actions: ActionCounts,
}

impl PaperSession {
    pub fn new(engine: DecisionEngine, config: SessionConfig) -> Self {
        let window = config
            .max_window
            .max(engine.feature_config().max_lookback());
        Self {
            engine,
            config,
            snapshot: MarketSnapshot::default(),
            state: PositionState::flat(),
            window,
            tick_index: 0,
            entry_tick: 0,
            peak_pnl: 0.0,
            trades: Vec::new(),
            actions: ActionCounts::default(),
        }
    }

    pub fn state(&self) -> &PositionState {
        &self.state
    }

    pub fn snapshot(&self) -> &MarketSnapshot {
        &self.snapshot
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    pub fn actions(&self) -> ActionCounts {
        self.actions
    }

    pub fn ticks_seen(&self) -> usize {
        self.tick_index
    }

    pub fn open_position(&self) -> Option<&OpenPosition> {
        self.state.position.as_open()
    }

    pub fn into_trades(self) -> Vec<TradeRecord> {
        self.trades
    }

    /// Feed one tick and apply the resulting action.
    pub fn on_tick(&mut self, tick: &Tick) -> Step {
        let tick_index = self.tick_index;
        self.tick_index += 1;

        self.snapshot.prices.push(tick.close);
        if self.snapshot.prices.len() > self.window {
            let excess = self.snapshot.prices.len() - self.window;
            self.snapshot.prices.drain(..excess);
        }
        self.snapshot.orderbook = tick.orderbook();
        self.state.trend_bias = tick.trend_bias.unwrap_or_default();

        self.mark_position(tick.close);

        let decision = self.engine.evaluate(&self.snapshot, &self.state);
        self.actions.record(decision.action);

        let closed = self.apply(&decision, tick_index, tick.close);
        Step {
            tick_index,
            decision,
            closed,
        }
    }

    /// Feed every tick in order; returns the trades closed along the way.
    pub fn run<'a, I>(&mut self, ticks: I) -> Vec<TradeRecord>
    where
        I: IntoIterator<Item = &'a Tick>,
    {
        ticks
            .into_iter()
            .filter_map(|tick| self.on_tick(tick).closed)
            .collect()
    }

    fn mark_position(&mut self, price: f64) {
        let trail_activate = self.engine.policy().trail_activate;
        let trail_distance = self.config.trail_distance;
        let Position::Open(open) = &mut self.state.position else {
            return;
        };

        open.pnl = open.pnl_at(price);
        open.time_in_trade += 1;
        self.peak_pnl = self.peak_pnl.max(open.pnl);

        // Ratchet: arm once the peak reaches activation, then only ever raise.
        if self.peak_pnl >= trail_activate {
            let candidate = self.peak_pnl - trail_distance;
            let stop = open.trail_stop.map_or(candidate, |cur| cur.max(candidate));
            if open.trail_stop != Some(stop) {
                debug!(
                    tick = self.tick_index - 1,
                    peak_pnl = self.peak_pnl,
                    trail_stop = stop,
                    "trailing stop raised"
                );
            }
            open.trail_stop = Some(stop);
        }
    }

    fn apply(&mut self, decision: &Decision, tick_index: usize, price: f64) -> Option<TradeRecord> {
        if self.state.cooldown > 0 {
            self.state.cooldown -= 1;
        }

        match decision.action {
            Action::Hold => None,
            Action::Buy | Action::Sell => {
                let side = decision.action.entry_side()?;
                info!(tick = tick_index, %side, price, reason = %decision.reason, "position opened");
                self.state.position = Position::Open(OpenPosition::new(side, price));
                self.entry_tick = tick_index;
                self.peak_pnl = 0.0;
                None
            }
            Action::Exit => {
                let Position::Open(open) = std::mem::take(&mut self.state.position) else {
                    return None;
                };
                let trade = TradeRecord::close(
                    &open,
                    self.entry_tick,
                    tick_index,
                    price,
                    self.config.quantity,
                    self.config.confidence,
                    self.config.live,
                    Some(decision.reason),
                );
                info!(
                    tick = tick_index,
                    side = %trade.side,
                    entry = trade.entry_price,
                    exit = trade.exit_price,
                    pnl_pct = trade.pnl_pct,
                    reason = %decision.reason,
                    "position closed"
                );
                self.state.cooldown = self.config.cooldown_cycles;
                self.peak_pnl = 0.0;
                self.trades.push(trade.clone());
                Some(trade)
            }
        }
    }
}
