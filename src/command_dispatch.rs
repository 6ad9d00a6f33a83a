//! Purpose: Hold top-level CLI command dispatch for `cogcfg`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Rejected requests still print their envelope on stdout before exiting non-zero.
//! Invariants: Library operations in `cogcfg::api`/`cogcfg::template` hold the business logic.

use super::*;

use cogcfg::api::{
    ApiConfig, build_request, handle_named_request, handle_request, load_from_file, save_to_file,
    simulate_api_call,
};
use cogcfg::template::{Resolver, UnknownKindPolicy};

pub(super) fn dispatch_command(command: Command, color_mode: ColorMode) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "cogcfg", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output(color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Fmt {
            input,
            pretty,
            max_depth,
        } => {
            let value = read_json_file(&input, max_depth)?;
            emit_json(&value, pretty, color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Validate {
            endpoint,
            params,
            file,
        } => {
            let request = match read_json_input(params.as_deref(), file.as_deref())? {
                Some(params) => Value::object().with("parameters", params),
                None => Value::object(),
            };
            let response = handle_request(&endpoint, &request);
            emit_json(&response, false, color_mode);
            Ok(response_outcome(&response))
        }
        Command::Handle { request, file } => {
            let request = match read_json_input(request.as_deref(), file.as_deref())? {
                Some(request) => request,
                None => read_json_file("-", DEFAULT_MAX_DEPTH)?,
            };
            let response = handle_named_request(&request);
            emit_json(&response, false, color_mode);
            Ok(response_outcome(&response))
        }
        Command::Resolve {
            template,
            config,
            input,
            strict,
        } => {
            let config = parse_context_pairs(&config, "--config")?;
            let input = parse_context_pairs(&input, "--input")?;
            let policy = if strict {
                UnknownKindPolicy::Reject
            } else {
                UnknownKindPolicy::PassThrough
            };
            let resolved = Resolver::new(&config)
                .with_input(&input)
                .with_policy(policy)
                .try_resolve(&template)?;
            println!("{resolved}");
            Ok(RunOutcome::ok())
        }
        Command::BuildRequest { config, out } => {
            let request = build_request(&load_config(&config)?);
            emit_document(&request, out.as_deref(), color_mode)?;
            Ok(RunOutcome::ok())
        }
        Command::Simulate {
            request,
            config,
            out,
        } => {
            let request = match request {
                Some(path) => load_from_file(&path)?,
                None => build_request(&load_config(&config)?),
            };
            let response = simulate_api_call(&request)?;
            emit_document(&response, out.as_deref(), color_mode)?;
            Ok(RunOutcome::ok())
        }
    }
}

/// Starts from the config file (or defaults) and applies flag overrides on top.
fn load_config(args: &ConfigArgs) -> Result<ApiConfig, Error> {
    let mut cfg = match &args.config_file {
        Some(path) => ApiConfig::from_value(&load_from_file(path)?).map_err(|err| err.with_path(path))?,
        None => ApiConfig::default(),
    };
    if let Some(model) = &args.model {
        cfg.model = model.clone();
    }
    if let Some(prompt) = &args.prompt {
        cfg.prompt = prompt.clone();
    }
    if let Some(temperature) = args.temperature {
        cfg.temperature = temperature;
    }
    if let Some(max_tokens) = args.max_tokens {
        cfg.max_tokens = max_tokens;
    }
    if let Some(top_p) = args.top_p {
        cfg.top_p = top_p;
    }
    if let Some(repeat_penalty) = args.repeat_penalty {
        cfg.repeat_penalty = repeat_penalty;
    }
    Ok(cfg)
}

fn emit_document(value: &Value, out: Option<&Path>, color_mode: ColorMode) -> Result<(), Error> {
    match out {
        Some(path) => {
            save_to_file(path, value)?;
            emit_json(&saved_receipt(path), false, color_mode);
        }
        None => emit_json(value, false, color_mode),
    }
    Ok(())
}
