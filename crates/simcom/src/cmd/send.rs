use simcom_modem::{CommandRequest, ModemConfig};

use crate::cmd::{open_modem, parse_duration, SendArgs};
use crate::exit::{modem_error, CliResult, SUCCESS};
use crate::output::{print_reply, OutputFormat, SendOutput};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let request = build_request(&args);

    let config = ModemConfig {
        default_timeout: timeout,
        ..ModemConfig::default()
    };
    let modem = open_modem(&args.port, config)?;

    let reply = modem
        .send_request(&request)
        .map_err(|err| modem_error("send failed", err))?;
    let unsolicited = modem.unsolicited().take();

    modem
        .close()
        .map_err(|err| modem_error("close failed", err))?;

    let out = SendOutput {
        port: args.port.port,
        command: args.command,
        result: reply.result,
        information: reply.information,
        unsolicited,
    };
    print_reply(&out, format);
    Ok(SUCCESS)
}

fn build_request(args: &SendArgs) -> CommandRequest {
    let mut request = CommandRequest::new(args.command.as_str()).errors(args.errors.iter().cloned());
    if !args.first_frame {
        if let Some(marker) = &args.expect {
            request = request.expect(marker.as_str());
        }
    }
    for marker in &args.collect {
        request = request.collect(marker.as_str());
    }
    request
}
