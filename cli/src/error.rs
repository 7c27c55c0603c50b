use netgauge_sampler::SamplerError;

/// Format an error for user-friendly display, with a hint where one helps.
pub fn format_error(error: &SamplerError) -> String {
    match error {
        SamplerError::AddressResolution { host } => {
            format!(
                "Address Resolution Error: unable to resolve '{}'.\n\nPlease check the domain name or IP address.",
                host
            )
        }
        SamplerError::PortUnavailable { addr } => {
            format!(
                "No Open Port: no reachable TCP port found on {}.\n\nSpecify a port explicitly with --port.",
                addr
            )
        }
        SamplerError::Config(e) => {
            format!(
                "Configuration Error: {}\n\nCheck your config file or NETGAUGE_ environment variables.",
                e
            )
        }
        SamplerError::Parse(msg) => {
            format!(
                "Parse Error: {}\n\nSupported duration formats: '60s', '2m', or a bare number of seconds.",
                msg
            )
        }
        SamplerError::Http(e) => {
            format!("Network Error: {}\n\nPlease check your connection and the target URL.", e)
        }
        _ => error.to_string(),
    }
}
