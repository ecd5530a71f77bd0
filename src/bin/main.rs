// tracker-power entry point and driver loop
//
// Boot sequence: logger -> hal -> esp-rtos time driver -> board -> controller
// Main loop: one Screensaver::tick per ticker period. The period follows
// the controller's poll rate: 10ms while awake or touched, 50ms while the
// screensaver is up and nobody is touching the panel.

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Ticker};
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::interrupt::software::SoftwareInterruptControl;
use esp_hal::timer::timg::TimerGroup;
use log::info;

use tracker_power::board::Board;
use tracker_power::drivers::NoFreqLock;
use tracker_power::kernel::EmbassyClock;
use tracker_power::power::Screensaver;
use tracker_power::settings::ScreensaverSettings;
use tracker_power::state::SharedState;

esp_bootloader_esp_idf::esp_app_desc!();

const SETTINGS: ScreensaverSettings = ScreensaverSettings::defaults();

static STATE: SharedState = SharedState::new(SETTINGS.timeout_sec);

#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger_from_env();
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    info!("booting...");

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_int = SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_int.software_interrupt0);
    info!("timer initialized.");

    let board = Board::init(peripherals.GPIO7, peripherals.GPIO2);
    info!("hardware initialized.");

    // no DFS on bare-metal C3: the CPU already runs at max clock
    let mut screensaver = Screensaver::new(
        EmbassyClock,
        &STATE,
        &board.scene,
        NoFreqLock,
        board.touch,
        SETTINGS,
    );
    screensaver.init();
    info!("screensaver ready.");

    let mut rate = screensaver.poll_rate();
    let mut ticker = Ticker::every(Duration::from_millis(rate.interval_ms() as u64));

    loop {
        ticker.next().await;
        screensaver.tick();

        let next = screensaver.poll_rate();
        if next != rate {
            rate = next;
            ticker = Ticker::every(Duration::from_millis(rate.interval_ms() as u64));
            info!("poll: {}", rate);
        }
    }
}
