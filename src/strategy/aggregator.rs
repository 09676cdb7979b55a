use crate::models::{Action, TradingSignal};

/// Combine signals by confidence-weighted plurality vote
///
/// Each signal adds its confidence to the total for its action. The action
/// with the greatest total wins; ties go to Buy, then Sell, then Hold. The
/// resulting confidence is the winning total divided by the number of
/// signals, so disagreement between indicators pulls it down.
///
/// Returns `None` for an empty slice.
pub fn combine_signals(signals: &[TradingSignal]) -> Option<TradingSignal> {
    if signals.is_empty() {
        return None;
    }

    let mut buy = 0.0;
    let mut sell = 0.0;
    let mut hold = 0.0;

    for signal in signals {
        match signal.action() {
            Action::Buy => buy += signal.confidence(),
            Action::Sell => sell += signal.confidence(),
            Action::Hold => hold += signal.confidence(),
        }
    }

    let (action, weight) = if buy >= sell && buy >= hold {
        (Action::Buy, buy)
    } else if sell >= hold {
        (Action::Sell, sell)
    } else {
        (Action::Hold, hold)
    };

    Some(TradingSignal::new(
        action,
        weight / signals.len() as f64,
        format!("Combined signal from {} indicators", signals.len()),
    ))
}
