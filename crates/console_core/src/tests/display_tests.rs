use super::*;

fn sample(mode: Mode, confidence: f64) -> StatusSample {
    StatusSample {
        mode,
        confidence,
        ..StatusSample::default()
    }
}

#[test]
fn signal_boundary_is_exclusive_on_the_high_side() {
    assert_eq!(SignalStrength::classify(71.0), SignalStrength::Strong);
    assert_eq!(SignalStrength::classify(70.0), SignalStrength::Weak);
    assert_eq!(SignalStrength::classify(70.01), SignalStrength::Strong);
    assert_eq!(SignalStrength::Strong.label(), "STRONG");
    assert_eq!(SignalStrength::Weak.label(), "WEAK");
}

#[test]
fn explore_status_is_neutral_regardless_of_confidence() {
    assert_eq!(StatusTone::classify(Mode::Explore, 99.0), StatusTone::Neutral);
    assert_eq!(StatusTone::classify(Mode::Explore, 0.0), StatusTone::Neutral);
}

#[test]
fn return_status_splits_on_strong_threshold() {
    assert_eq!(StatusTone::classify(Mode::Return, 71.0), StatusTone::Positive);
    assert_eq!(StatusTone::classify(Mode::Return, 70.0), StatusTone::Alert);
}

#[test]
fn gauge_has_three_bands() {
    assert_eq!(GaugeBand::classify(100.0), GaugeBand::Good);
    assert_eq!(GaugeBand::classify(70.0), GaugeBand::Fair);
    assert_eq!(GaugeBand::classify(30.5), GaugeBand::Fair);
    assert_eq!(GaugeBand::classify(30.0), GaugeBand::Poor);
}

#[test]
fn gauge_percent_rounds_and_clamps() {
    assert_eq!(gauge_percent(69.5), 70);
    assert_eq!(gauge_percent(69.4), 69);
    assert_eq!(gauge_percent(150.0), 100);
    assert_eq!(gauge_percent(f64::NAN), 0);
}

#[test]
fn display_summarizes_a_sample() {
    let display = StatusDisplay::from(&sample(Mode::Return, 88.0));
    assert_eq!(display.signal, SignalStrength::Strong);
    assert_eq!(display.tone, StatusTone::Positive);
    assert_eq!(display.gauge, GaugeBand::Good);
    assert_eq!(display.gauge_percent, 88);
    assert_eq!(display.toggle_label, "RESUME EXPLORATION");

    let display = StatusDisplay::from(&sample(Mode::Explore, 12.0));
    assert_eq!(display.toggle_label, "INITIATE RETURN");
    assert_eq!(display.gauge, GaugeBand::Poor);
}
