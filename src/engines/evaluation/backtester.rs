use crate::{
    config::TradeManagementConfig,
    data::MarketData,
    engines::{generation::agent::Agent, metrics::MetricsEngine},
    error::{GenetraderError, Result},
    functions::{registry::IndicatorRegistry, strategy::ResolvedStrategy},
    types::{Bar, Direction, ExitReason, FitnessMetrics, TradeResult, ENTRY_REASON_SIGNAL},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Absolute signal above which a flat engine opens a position.
pub const ENTRY_THRESHOLD: f64 = 0.5;
/// Absolute signal below which an open position is closed at the bar's close.
pub const EXIT_THRESHOLD: f64 = 0.2;

/// Receives trade lifecycle events from a backtest run.
pub trait TradeObserver: Send + Sync {
    fn on_trade_closed(&self, _trade: &TradeResult) {}

    /// Called when the data ends with a position still open.
    fn on_position_abandoned(&self, _position: &OpenPosition, _last_bar: usize) {}
}

pub struct LogTradeObserver;

impl TradeObserver for LogTradeObserver {
    fn on_trade_closed(&self, trade: &TradeResult) {
        log::debug!(
            "Closed {:?} trade bars {}..{}: pnl {:.2} ({})",
            trade.direction(),
            trade.entry_bar,
            trade.exit_bar,
            trade.pnl,
            trade.exit_reason
        );
    }

    fn on_position_abandoned(&self, position: &OpenPosition, last_bar: usize) {
        log::debug!(
            "Position opened at bar {} still open at bar {}, left out of results",
            position.entry_bar,
            last_bar
        );
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenPosition {
    pub entry_bar: usize,
    pub entry_time: Option<DateTime<Utc>>,
    pub entry_price: f64,
    /// Signed: negative for shorts
    pub size: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub max_adverse_excursion: f64,
    pub max_favorable_excursion: f64,
}

impl OpenPosition {
    pub fn direction(&self) -> Direction {
        Direction::from_signal(self.size)
    }

    fn track_excursion(&mut self, close: f64) {
        let movement = (close - self.entry_price) * self.direction().sign();
        self.max_adverse_excursion = self.max_adverse_excursion.min(movement);
        self.max_favorable_excursion = self.max_favorable_excursion.max(movement);
    }

    /// Exit price and reason for this bar, checked in stop, target, signal order.
    fn exit_for(&self, bar: &Bar, signal: f64) -> Option<(f64, ExitReason)> {
        let (stop_hit, target_hit) = match self.direction() {
            Direction::Long => (bar.low <= self.stop_loss, bar.high >= self.take_profit),
            Direction::Short => (bar.high >= self.stop_loss, bar.low <= self.take_profit),
        };

        if stop_hit {
            Some((self.stop_loss, ExitReason::StopLoss))
        } else if target_hit {
            Some((self.take_profit, ExitReason::TakeProfit))
        } else if signal.abs() < EXIT_THRESHOLD {
            Some((bar.close, ExitReason::Signal))
        } else {
            None
        }
    }
}

/// Mutable bookkeeping of a single run.
struct BacktestState {
    capital: f64,
    equity_curve: Vec<f64>,
    peak: f64,
    current_drawdown: f64,
    max_drawdown: f64,
    position: Option<OpenPosition>,
    trades: Vec<TradeResult>,
}

impl BacktestState {
    fn new(initial_capital: f64) -> Self {
        Self {
            capital: initial_capital,
            equity_curve: vec![initial_capital],
            peak: initial_capital,
            current_drawdown: 0.0,
            max_drawdown: 0.0,
            position: None,
            trades: Vec::new(),
        }
    }

    fn update_drawdown(&mut self) {
        self.peak = self.peak.max(self.capital);
        self.current_drawdown = (self.peak - self.capital) / self.peak;
        self.max_drawdown = self.max_drawdown.max(self.current_drawdown);
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub trades: Vec<TradeResult>,
    /// Initial capital followed by the capital after each closed trade
    pub equity_curve: Vec<f64>,
    pub final_capital: f64,
    pub max_drawdown: f64,
    pub metrics: FitnessMetrics,
    /// Position left open when the data ran out
    pub abandoned_position: Option<OpenPosition>,
}

/// Replays a strategy over a bar series one bar at a time.
#[derive(Clone)]
pub struct BacktestEngine {
    initial_capital: f64,
    trade_config: TradeManagementConfig,
    observer: Arc<dyn TradeObserver>,
}

impl BacktestEngine {
    pub fn new(initial_capital: f64, trade_config: TradeManagementConfig) -> Result<Self> {
        if initial_capital.is_nan() || initial_capital <= 0.0 {
            return Err(GenetraderError::BacktestError(format!(
                "initial capital must be positive, got {}",
                initial_capital
            )));
        }
        Ok(Self {
            initial_capital,
            trade_config,
            observer: Arc::new(LogTradeObserver),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn TradeObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn trade_config(&self) -> &TradeManagementConfig {
        &self.trade_config
    }

    pub fn run(&self, agent: &Agent, data: &MarketData, registry: &IndicatorRegistry) -> BacktestResult {
        let strategy = registry.resolve(&agent.indicators, &agent.weights);
        self.run_resolved(&strategy, data)
    }

    pub fn run_resolved(&self, strategy: &ResolvedStrategy, data: &MarketData) -> BacktestResult {
        self.run_with_signal(data.bars(), |history| strategy.signal(history))
    }

    /// Core loop. `signal` sees the history up to and including the current bar.
    pub fn run_with_signal<F>(&self, bars: &[Bar], signal: F) -> BacktestResult
    where
        F: Fn(&[Bar]) -> f64,
    {
        let mut state = BacktestState::new(self.initial_capital);

        for (i, bar) in bars.iter().enumerate() {
            let s = signal(&bars[..=i]);

            match state.position.as_mut() {
                None => {
                    if s.abs() > ENTRY_THRESHOLD {
                        state.position = Some(self.open_position(i, bar, s, state.capital));
                    }
                }
                Some(position) => {
                    position.track_excursion(bar.close);
                    if let Some((exit_price, reason)) = position.exit_for(bar, s) {
                        self.close_position(&mut state, i, bar, exit_price, reason);
                    }
                }
            }
        }

        if let Some(position) = &state.position {
            self.observer
                .on_position_abandoned(position, bars.len().saturating_sub(1));
        }

        let metrics = MetricsEngine::calculate(
            &state.trades,
            self.initial_capital,
            state.capital,
            state.max_drawdown,
        );

        BacktestResult {
            trades: state.trades,
            equity_curve: state.equity_curve,
            final_capital: state.capital,
            max_drawdown: state.max_drawdown,
            metrics,
            abandoned_position: state.position,
        }
    }

    fn open_position(&self, bar_index: usize, bar: &Bar, signal: f64, capital: f64) -> OpenPosition {
        let sign = Direction::from_signal(signal).sign();
        let entry_price = bar.close;
        OpenPosition {
            entry_bar: bar_index,
            entry_time: bar.timestamp,
            entry_price,
            size: sign * self.trade_config.position_size(capital),
            stop_loss: entry_price * (1.0 - self.trade_config.stop_loss_pct * sign),
            take_profit: entry_price * (1.0 + self.trade_config.take_profit_pct * sign),
            max_adverse_excursion: 0.0,
            max_favorable_excursion: 0.0,
        }
    }

    fn close_position(
        &self,
        state: &mut BacktestState,
        bar_index: usize,
        bar: &Bar,
        exit_price: f64,
        reason: ExitReason,
    ) {
        let position = match state.position.take() {
            Some(p) => p,
            None => return,
        };

        let pnl = (exit_price - position.entry_price) * position.size;
        let return_pct = pnl / state.capital;
        state.capital += pnl;
        state.equity_curve.push(state.capital);
        state.update_drawdown();

        let trade = TradeResult {
            entry_bar: position.entry_bar,
            exit_bar: bar_index,
            entry_time: position.entry_time,
            exit_time: bar.timestamp,
            entry_price: position.entry_price,
            exit_price,
            position_size: position.size,
            pnl,
            return_pct,
            drawdown: state.current_drawdown,
            duration: bar_index - position.entry_bar,
            max_adverse_excursion: position.max_adverse_excursion,
            max_favorable_excursion: position.max_favorable_excursion,
            entry_reason: ENTRY_REASON_SIGNAL.to_string(),
            exit_reason: reason,
        };
        self.observer.on_trade_closed(&trade);
        state.trades.push(trade);
    }
}
