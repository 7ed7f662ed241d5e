use std::io::{self, Write};

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::chat::{Session, TurnController, TurnOutcome};
use crate::core::AppConfig;

pub async fn run() -> Result<()> {
    let config = AppConfig::from_env()?;
    let controller = TurnController::new(&config);
    let session = Session::new();

    let mut rl = DefaultEditor::new().expect("Editor failed");

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                // Print each new fragment as it arrives. `printed`
                // tracks how much of the accumulated text is already on
                // screen.
                let mut printed = 0;
                let result = controller
                    .run_turn(&session, &line, |text| {
                        print!("{}", &text[printed..]);
                        let _ = io::stdout().flush();
                        printed = text.len();
                    })
                    .await;

                match result {
                    Ok(TurnOutcome::Completed(_)) => println!(),
                    Ok(TurnOutcome::Ignored) => {}
                    Err(err) => {
                        if printed > 0 {
                            println!();
                        }
                        eprintln!("Error: {}", err);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
