use natmsg_lifeline::ProcessGroup;
use natmsg_port::Port;
use natmsg_relay::{spawn_processor, Relay};
use tracing::{debug, info};

use crate::cmd::{parse_duration, RelayArgs};
use crate::exit::{io_error, relay_error, CliResult, SUCCESS};

pub async fn run(args: RelayArgs) -> CliResult<i32> {
    if let Some(origin) = &args.origin {
        info!(%origin, "relay requested by browser");
    }
    let sync_timeout = parse_duration(&args.sync_timeout)?;

    let program = std::env::current_exe()
        .map_err(|err| io_error("cannot resolve own executable path", err))?;

    let mut group = ProcessGroup::new();
    let (mut child, inner) = spawn_processor(&program, &mut group, Some(sync_timeout))
        .await
        .map_err(|err| relay_error("processor startup failed", err))?;

    let outer = Port::stdio();
    let mut relay = Relay::new(outer, inner);

    relay
        .sync(Some(sync_timeout))
        .await
        .map_err(|err| relay_error("handshake failed", err))?;
    debug!("processor synchronized");

    let stop = relay.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received; stopping relay");
            stop.stop();
        }
    });

    let result = relay.run().await;

    // The group kills the processor if it is still alive; reap it so the
    // exit does not leave a zombie behind.
    drop(group);
    let _ = child.wait();

    result.map_err(|err| relay_error("relay failed", err))?;
    Ok(SUCCESS)
}
