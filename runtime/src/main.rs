use std::env;
use std::fs;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use signal_hook::consts::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;

use core::types::{EquipmentSlotKind, NavigationPath, NavigationStep, Region, RuntimeConfig, WorldCoord};
use runtime::input::EnigoBackend;
use runtime::policy::{CombatPolicy, EscapeTeleport, GatheringPolicy, Policy, RequiredEquipmentSlot};
use runtime::Runtime;

fn default_game_area() -> Region {
    Region::new(0, 0, 765, 503, 0)
}

fn setup_signal_handling(quit_flag: Arc<AtomicBool>) -> (std::thread::JoinHandle<()>, signal_hook::iterator::Handle) {
    let mut signals = Signals::new([SIGINT, SIGTERM, SIGQUIT, SIGHUP]).unwrap();
    let handle = signals.handle();

    let signal_thread = std::thread::spawn(move || {
        for sig in signals.forever() {
            match sig {
                SIGINT | SIGTERM | SIGQUIT => {
                    if !quit_flag.load(Ordering::SeqCst) {
                        log::info!("Got signal to terminate. Shutdown initiated...");
                    } else {
                        log::info!("Alright, alright, I'm already terminating!");
                    }
                    quit_flag.store(true, Ordering::SeqCst);
                }
                _ => {
                    log::warn!("Received unsupported signal: {}", sig);
                }
            }
        }
    });

    (signal_thread, handle)
}

/// Worked-example gathering policy: power-chop willows and bank nothing,
/// matching §9's "supplied as worked examples" resolution of the policy
/// open question.
fn demo_gathering_policy() -> Policy {
    Policy::Gathering(GatheringPolicy {
        resource_ids: vec![1308, 1309],
        tool_ids: vec![1351],
        food_item_ids: vec![],
        required_equipment: vec![RequiredEquipmentSlot {
            slot: EquipmentSlotKind::Weapon,
            item_id: 1351,
        }],
        powerdrop: true,
        bank_when_full: false,
        path_to_work_area: NavigationPath::new(vec![NavigationStep::walk(WorldCoord::new(3163, 3469, 0))]),
        path_to_bank: NavigationPath::default(),
    })
}

/// Worked-example combat policy: kill cows, bank loot when full.
fn demo_combat_policy() -> Policy {
    Policy::Combat(CombatPolicy {
        target_npc_ids: vec![81],
        loot_item_ids: vec![1739, 995],
        special_loot: vec![],
        escape_teleport: Some(EscapeTeleport {
            item_id: 1712,
            action: "Rub".to_string(),
        }),
        food_item_ids: vec![2142],
        required_equipment: vec![],
        required_inventory: vec![],
        escape_health_threshold_pct: 20,
        food_health_threshold_pct: 50,
        min_food_count: 3,
        path_to_work_area: NavigationPath::new(vec![NavigationStep::walk(WorldCoord::new(3253, 3264, 0))]),
        path_to_bank: NavigationPath::new(vec![NavigationStep::walk(WorldCoord::new(3253, 3420, 0))]),
    })
}

fn policy_for(config: &RuntimeConfig) -> Policy {
    match config.policy.as_str() {
        "combat" => demo_combat_policy(),
        _ => demo_gathering_policy(),
    }
}

fn load_config(path: &str) -> RuntimeConfig {
    match fs::read_to_string(path) {
        Ok(text) => RuntimeConfig::from_toml_str(&text).unwrap_or_else(|e| {
            eprintln!("Invalid configuration at {path}: {e}. Exiting.");
            process::exit(1);
        }),
        Err(_) => {
            log::warn!("no config file at {path}, using defaults");
            RuntimeConfig::default()
        }
    }
}

fn level_filter(name: &str) -> log::LevelFilter {
    match name.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let config_path = args.get(1).map(String::as_str).unwrap_or("fieldbot.toml");

    let config = load_config(config_path);

    let log_file = config.log_file_path.clone().unwrap_or_else(|| "fieldbot.log".to_string());
    core::initialize_logger(level_filter(&config.log_level), Some(&log_file)).unwrap_or_else(|e| {
        eprintln!("Failed to initialize logger: {}. Exiting.", e);
        process::exit(1);
    });

    log::info!("Starting field bot runtime");
    log::info!("Process PID: {}", process::id());
    log::info!("Active policy: {}", config.policy);

    let quit_flag = Arc::new(AtomicBool::new(false));
    let (signal_thread, handle) = setup_signal_handling(quit_flag.clone());

    let backend = EnigoBackend::new().unwrap_or_else(|e| {
        log::error!("Failed to initialize input backend: {e}. Exiting.");
        process::exit(1);
    });

    let policy = policy_for(&config);

    let mut runtime = Runtime::new(&config, backend, policy, default_game_area()).unwrap_or_else(|e| {
        log::error!("Failed to initialize runtime: {e}. Exiting.");
        process::exit(1);
    });

    log::info!("Entering main bot loop...");
    runtime.run(&quit_flag);

    log::info!("{}", runtime.stats().summary());
    log::info!("Shutdown complete.");

    handle.close();
    signal_thread.join().unwrap_or_else(|e| {
        log::error!("Failed to join signal handling thread: {:?}", e);
    });
}
