//! Interactive confirmation with a timeout.

use std::io::Write;
use std::time::Duration;

use lattice_core::constants::USER_INPUT_WAIT_SECS;

/// Ask the operator a yes/no question, defaulting to "no" when nothing is
/// answered within the input timeout.
pub async fn ask_user_yes_or_no(prompt: &str) -> bool {
    let prompt = prompt.to_string();
    tokio::task::spawn_blocking(move || ask_blocking(&prompt)).await.unwrap_or(false)
}

fn ask_blocking(prompt: &str) -> bool {
    println!();
    let (tx, rx) = std::sync::mpsc::channel();
    loop {
        print!("{}  Yy|Nn: ", prompt);
        let _res = std::io::stdout().flush();

        let tx = tx.clone();
        std::thread::spawn(move || {
            let mut line = String::new();
            let input = match std::io::stdin().read_line(&mut line) {
                Ok(_) => line.trim().to_lowercase(),
                Err(err) => {
                    println!("Failed to read input: {}, defaulting to no", err);
                    "n".to_string()
                }
            };
            let _res = tx.send(input);
        });

        match rx.recv_timeout(Duration::from_secs(USER_INPUT_WAIT_SECS)) {
            Ok(input) => match input.as_str() {
                "y" => return true,
                "n" => return false,
                other => {
                    println!("invalid input {:?}", other);
                    continue;
                }
            },
            Err(_timeout) => {
                println!("\ntimed out, defaulting to no");
                return false;
            }
        }
    }
}
