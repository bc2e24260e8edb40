//! Main loop dispatch - a player core feeding events to listeners
//!
//! Shows the delivery paths of the event manager:
//! - Events sent from a worker thread are queued and delivered on the main loop
//! - Events sent from inside the main loop with `Sync` are delivered immediately
//! - Async tune raises the priority of queued deliveries
//! - The legacy adapter for listeners still reading the fixed-layout record
//!
//! Run with: AAMP_LOG_MODE=development cargo run -p aamp-core-event-manager --example main_loop_dispatch

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use aamp_event::payload::{EventPayload, Progress};
use aamp_event::{
    listener_fn, Event, EventMode, EventType, LegacyEvent, LegacyEventData, LegacyListener,
    ListenerHandle, PlayerState,
};
use aamp_event_manager::{logging, EventManager, EventManagerConfig, MainLoop, TaskScheduler};

const SESSION: &str = "demo-session";

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    logging::init_logging_from_env()?;

    println!("=== AAMP event dispatch ===\n");

    let main_loop = MainLoop::new();
    let loop_thread = main_loop.spawn("aamp-main-loop")?;

    let config = EventManagerConfig::new().with_player_id(0);
    let manager = Arc::new(EventManager::with_config(config, Arc::new(main_loop.clone()))?);

    manager.add_event_listener(
        EventType::StateChanged,
        listener_fn(|event| {
            println!(
                "[{}] state -> {:?}",
                thread::current().name().unwrap_or("?"),
                event.state()
            );
        }),
    );

    let legacy: ListenerHandle = Arc::new(LegacyListener::new(|event: &LegacyEvent<'_>| {
        if let LegacyEventData::Progress(progress) = &event.data {
            println!(
                "[legacy] progress {:.0}/{:.0} ms",
                progress.position_miliseconds, progress.duration_miliseconds
            );
        }
    }));
    manager.add_event_listener(EventType::Progress, legacy);

    manager.add_listener_for_all_events(listener_fn(|event| {
        println!("[all] {} ({})", event.event_type(), event.session_id());
    }));

    // Worker thread: not on the main loop, so everything is queued
    let producer = {
        let manager = Arc::clone(&manager);
        thread::spawn(move || {
            manager.send_event(&Event::state_changed(PlayerState::Preparing, SESSION).into_ptr(), EventMode::Default);
            manager.send_event(&Event::new(EventType::Tuned, SESSION).into_ptr(), EventMode::Default);
            for step in 1..=3 {
                let progress = Progress {
                    duration_ms: 30_000.0,
                    position_ms: f64::from(step) * 1_000.0,
                    speed: 1.0,
                    ..Progress::default()
                };
                manager.send_event(
                    &Event::from_payload(EventPayload::Progress(progress), SESSION).into_ptr(),
                    EventMode::Async,
                );
            }
        })
    };
    producer.join().map_err(|_| "producer thread panicked")?;

    // From inside the loop, Sync delivers before send_event returns
    {
        let manager = Arc::clone(&manager);
        main_loop.schedule_once(
            0,
            Box::new(move || {
                let event = Event::state_changed(PlayerState::Playing, SESSION).into_ptr();
                manager.send_event(&event, EventMode::Sync);
                println!("[aamp-main-loop] sync delivery done");
            }),
        );
    }

    manager.set_async_tune_state(true);
    manager.send_event(&Event::new(EventType::Eos, SESSION).into_ptr(), EventMode::Default);

    thread::sleep(Duration::from_millis(200));

    println!("\nstate changes dispatched: {}", manager.event_stats(EventType::StateChanged));
    println!("events still queued: {}", manager.pending_event_count());

    manager.set_player_state(PlayerState::Released);
    manager.teardown();
    drop(manager);
    loop_thread.join();

    Ok(())
}
