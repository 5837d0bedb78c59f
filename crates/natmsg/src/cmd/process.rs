use natmsg_relay::{connect_processor, run_processor};
use tracing::info;

use crate::cmd::ProcessArgs;
use crate::exit::{relay_error, CliResult, SUCCESS};

pub async fn run(args: ProcessArgs) -> CliResult<i32> {
    // Arm first: if the relay dies before we even connect, this process
    // must not linger.
    natmsg_lifeline::bind_to_parent();

    let port = connect_processor(&args.pipe)
        .await
        .map_err(|err| relay_error("cannot reach relay", err))?;
    info!(token = %args.pipe, "processor connected");

    run_processor(port, echo_reply)
        .await
        .map_err(|err| relay_error("processor failed", err))?;

    info!("processor stopped");
    Ok(SUCCESS)
}

/// Example business logic: wrap each message in an `{"echo": ...}` reply.
fn echo_reply(message: &str) -> Result<Vec<String>, serde_json::Error> {
    let reply = serde_json::to_string(&serde_json::json!({ "echo": message }))?;
    Ok(vec![reply])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_wraps_plain_text() {
        let replies = echo_reply("hello").unwrap();
        assert_eq!(replies, vec![r#"{"echo":"hello"}"#.to_string()]);
    }

    #[test]
    fn echo_escapes_embedded_quotes() {
        let replies = echo_reply(r#"say "hi""#).unwrap();
        assert_eq!(replies, vec![r#"{"echo":"say \"hi\""}"#.to_string()]);
    }
}
