#[cfg(test)]
mod tests {
    use std::time::Duration;
    use tokio::sync::watch;
    use crate::workout::timer::{RestOutcome, RestTimer, TimerTick};

    #[test]
    fn test_zero_or_negative_duration_has_no_countdown() {
        for secs in [0, -5] {
            let timer = RestTimer::new(secs);
            assert!(timer.is_finished());
            assert!(!timer.has_countdown());
            assert_eq!(timer.elapsed_fraction(), 1.0);
        }
    }

    #[test]
    fn test_manual_ticks() {
        let mut timer = RestTimer::new(3);
        assert_eq!(timer.tick(), TimerTick::Running { remaining_secs: 2 });
        assert_eq!(timer.tick(), TimerTick::Running { remaining_secs: 1 });
        assert_eq!(timer.tick(), TimerTick::Finished);
        assert_eq!(timer.tick(), TimerTick::Finished);
        assert_eq!(timer.remaining_secs(), 0);
    }

    #[test]
    fn test_skip_finishes() {
        let mut timer = RestTimer::new(90);
        timer.tick();
        timer.skip();
        assert!(timer.is_finished());
        assert_eq!(timer.tick(), TimerTick::Finished);
        assert_eq!(timer.remaining_secs(), 89);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_elapses() {
        let (_tx, rx) = watch::channel(false);
        let mut seen = Vec::new();
        let outcome = RestTimer::new(3).run(rx, |remaining| seen.push(remaining)).await;
        assert_eq!(outcome, RestOutcome::Elapsed);
        assert_eq!(seen, vec![2, 1, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_zero_is_immediate() {
        let (_tx, rx) = watch::channel(false);
        let outcome = RestTimer::new(0).run(rx, |_| panic!("no ticks expected")).await;
        assert_eq!(outcome, RestOutcome::Immediate);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_skipped_midway() {
        let (tx, rx) = watch::channel(false);
        let mut seen = Vec::new();

        let skipper = async move {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            tx.send(true).unwrap();
            tx
        };
        let (outcome, _tx) = tokio::join!(
            RestTimer::new(5).run(rx, |remaining| seen.push(remaining)),
            skipper
        );

        assert_eq!(outcome, RestOutcome::Skipped);
        assert_eq!(seen, vec![4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_dropped_sender_skips() {
        let (tx, rx) = watch::channel(false);
        drop(tx);
        let outcome = RestTimer::new(60).run(rx, |_| {}).await;
        assert_eq!(outcome, RestOutcome::Skipped);
    }
}
