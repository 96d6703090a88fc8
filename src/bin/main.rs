// voltbar entry point and main loop
//
// Boot sequence: logger -> hardware -> tick timer -> monitor boot
// Main loop: WFI until the 10 ms timer fires, sample battery + buttons,
// run one monitor tick, repeat.
//
// A missing display or audio module halts here with a log line; there
// is no retry. The Light button's restart request arms the RTC
// watchdog and waits for it to bite.

#![no_std]
#![no_main]

use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::time::Duration;
use esp_hal::timer::PeriodicTimer;
use log::{error, info};

use core::cell::RefCell;
use critical_section::Mutex;

use voltbar::board::{Board, DIVIDER};
use voltbar_kernel::board::SensorAdc;
use voltbar_kernel::config::MonitorConfig;
use voltbar_kernel::kernel::wake::{self, TICK_MS, signal_timer, try_wake};
use voltbar_kernel::kernel::{Monitor, Outputs, TickOutcome};

esp_bootloader_esp_idf::esp_app_desc!();

static TIMER0: Mutex<RefCell<Option<PeriodicTimer<'static, esp_hal::Blocking>>>> =
    Mutex::new(RefCell::new(None));

#[esp_hal::handler(priority = esp_hal::interrupt::Priority::Priority1)]
fn timer0_handler() {
    critical_section::with(|cs| {
        if let Some(timer) = TIMER0.borrow_ref_mut(cs).as_mut() {
            timer.clear_interrupt();
        }
    });
    signal_timer();
}

fn halt() -> ! {
    loop {
        wake::wait_for_interrupt();
    }
}

#[esp_hal::main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    info!("booting...");

    let board = match Board::init(peripherals) {
        Ok(board) => board,
        Err(e) => {
            error!("board: {}", e);
            halt();
        }
    };
    let Board {
        display,
        audio,
        storage,
        indicator,
        mut inputs,
        mut battery,
        mut watchdog,
        mut tick_timer,
    } = board;
    info!("hardware initialized.");

    let cfg = MonitorConfig {
        divider: DIVIDER,
        ..MonitorConfig::defaults()
    };
    let parts = Outputs {
        display,
        audio,
        storage,
        indicator,
        delay: Delay::new(),
    };
    let mut monitor = match Monitor::boot(parts, cfg) {
        Ok(m) => m,
        Err(e) => {
            error!("boot: {}, halting", e);
            halt();
        }
    };

    critical_section::with(|cs| {
        tick_timer.set_interrupt_handler(timer0_handler);
        if let Err(e) = tick_timer.start(Duration::from_millis(TICK_MS)) {
            error!("timer: start failed: {:?}", e);
        }
        tick_timer.listen();
        TIMER0.borrow_ref_mut(cs).replace(tick_timer);
    });
    info!("timer: {}ms tick", TICK_MS);

    loop {
        if !try_wake() {
            wake::wait_for_interrupt();
            continue;
        }

        let now = wake::uptime();
        let snapshot = inputs.poll(now, battery.read_code());

        if monitor.tick(now, &snapshot) == TickOutcome::Restart {
            info!("restart: arming watchdog");
            watchdog.restart();
        }
    }
}
