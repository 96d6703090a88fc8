// Wake flag signaling between the timer ISR and the main loop
//
// The ISR sets the flag and advances uptime; the main loop consumes the
// flag via try_wake(). Both sides go through a critical section.

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, Ordering};

use super::clock::Instant;

/// Period of the tick timer.
pub const TICK_MS: u64 = 10;

static WAKE_TIMER: AtomicBool = AtomicBool::new(false);

static UPTIME_MS: critical_section::Mutex<Cell<u64>> =
    critical_section::Mutex::new(Cell::new(0));

#[inline]
pub fn signal_timer() {
    WAKE_TIMER.store(true, Ordering::Release);
    critical_section::with(|cs| {
        let ms = UPTIME_MS.borrow(cs);
        ms.set(ms.get().wrapping_add(TICK_MS));
    });
}

/// Consume a pending timer wake.
pub fn try_wake() -> bool {
    critical_section::with(|_| {
        let pending = WAKE_TIMER.load(Ordering::Relaxed);
        if pending {
            WAKE_TIMER.store(false, Ordering::Relaxed);
        }
        pending
    })
}

pub fn uptime() -> Instant {
    Instant::from_millis(critical_section::with(|cs| UPTIME_MS.borrow(cs).get()))
}

#[inline]
pub fn wait_for_interrupt() {
    #[cfg(target_arch = "riscv32")]
    unsafe {
        core::arch::asm!("wfi", options(nomem, nostack));
    }

    #[cfg(not(target_arch = "riscv32"))]
    {
        core::hint::spin_loop();
    }
}
