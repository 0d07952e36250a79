//! Scoped suppression of diagnostic output
//!
//! Lives in its own test binary: the subscriber and its level gate are
//! process-global, so no other test may touch them concurrently.

use pm25_forecast::error::{ForecastError, Result};
use pm25_forecast::logging::{is_suppressed, setup_logging, suppress};

fn failing_step() -> Result<()> {
    let _quiet = suppress();
    Err(ForecastError::processing("boom"))
}

#[test]
fn test_suppression_restores_on_every_exit_path() {
    setup_logging("debug").expect("first subscriber install succeeds");

    assert!(!is_suppressed());
    {
        let _outer = suppress();
        assert!(is_suppressed());
        {
            let _inner = suppress();
            assert!(is_suppressed());
        }
        assert!(is_suppressed(), "inner guard must restore the outer state");
    }
    assert!(!is_suppressed());

    assert!(failing_step().is_err());
    assert!(!is_suppressed(), "early return must still restore output");

    // A second install fails cleanly instead of panicking.
    assert!(setup_logging("info").is_err());
}
