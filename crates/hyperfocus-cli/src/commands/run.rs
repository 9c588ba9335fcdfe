//! Live engine harness.
//!
//! Hosts the engine on real timers and maps stdin lines to host signals and
//! presenter decisions, printing everything the engine emits as JSON lines.
//! Useful for poking at the escalation and cooldown behavior by hand.

use std::io::BufRead;
use std::sync::{Arc, Mutex};

use hyperfocus_core::{
    ActivityKind, EngineConfig, EngineOutput, HostSignal, ScriptedEventSource, SuggestionDecision,
};
use uuid::Uuid;

enum Input {
    Signal(HostSignal),
    Decision(SuggestionDecision),
    ManualBreak(u32),
    Quit,
}

fn parse_line(line: &str) -> Option<Input> {
    let mut words = line.split_whitespace();
    let head = words.next()?;
    let input = match head {
        "key" | "k" => Input::Signal(HostSignal::Activity {
            kind: ActivityKind::Keystroke,
        }),
        "click" | "c" => Input::Signal(HostSignal::Activity {
            kind: ActivityKind::PointerClick,
        }),
        "move" | "m" => Input::Signal(HostSignal::Activity {
            kind: ActivityKind::PointerMove,
        }),
        "scroll" => Input::Signal(HostSignal::Activity {
            kind: ActivityKind::Scroll,
        }),
        "touch" => Input::Signal(HostSignal::Activity {
            kind: ActivityKind::TouchStart,
        }),
        "focus" => Input::Signal(HostSignal::WindowFocus),
        "blur" => Input::Signal(HostSignal::WindowBlur),
        "snooze" => Input::Decision(SuggestionDecision::Snooze),
        "dismiss" => Input::Decision(SuggestionDecision::Dismiss),
        "break" => Input::Decision(SuggestionDecision::TakeBreak {
            duration_minutes: words.next()?.parse().ok()?,
        }),
        "manual" => Input::ManualBreak(words.next()?.parse().ok()?),
        "quit" | "q" => Input::Quit,
        _ => return None,
    };
    Some(input)
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_async())
}

async fn run_async() -> Result<(), Box<dyn std::error::Error>> {
    let (signal_tx, mut source) = ScriptedEventSource::channel();
    let mut handle = hyperfocus_core::spawn(EngineConfig::load(), &mut source);
    let client = handle.client();
    let pending: Arc<Mutex<Option<Uuid>>> = Arc::new(Mutex::new(None));

    eprintln!(
        "signals: key click move scroll touch focus blur | \
         decisions: break <min> snooze dismiss | manual <min> | quit"
    );

    // Stdin is blocking; read it on a plain thread and act on each line
    // there. All engine mutation still happens inside the engine task.
    let reader_pending = Arc::clone(&pending);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_line(line.trim()) {
                Some(Input::Signal(signal)) => {
                    if signal_tx.send(signal).is_err() {
                        break;
                    }
                }
                Some(Input::Decision(decision)) => {
                    match reader_pending.lock().ok().and_then(|mut slot| slot.take()) {
                        Some(id) => client.decide(id, decision),
                        None => eprintln!("no pending suggestion"),
                    }
                }
                Some(Input::ManualBreak(minutes)) => client.record_manual_break(minutes),
                Some(Input::Quit) => {
                    client.stop();
                    break;
                }
                None => eprintln!("unrecognized input: {line}"),
            }
        }
        // EOF also stops the engine.
        client.stop();
    });

    while let Some(output) = handle.next().await {
        match output {
            EngineOutput::Event(event) => println!("{}", serde_json::to_string(&event)?),
            EngineOutput::Suggestion(suggestion) => {
                if let Ok(mut slot) = pending.lock() {
                    *slot = Some(suggestion.id);
                }
                println!("{}", serde_json::to_string(&suggestion)?);
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}
