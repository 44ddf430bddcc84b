use std::path::PathBuf;

use anyhow::{Context, Result};
use bytes::{Bytes, BytesMut};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};
use wirelog_protocol::{
    ApiKey, CreateTopicsRequest, DeleteTopicsRequest, FetchRequest, KafkaRelease, MeterRegistry,
    ProtocolBody, ProtocolConfig, RequestBody, ResponseBody,
};

/// Inspect and produce Kafka protocol message bodies
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the version of each message a broker release accepts
    Versions {
        #[arg(short, long, default_value_t = KafkaRelease::default())]
        release: KafkaRelease,
    },
    /// Encode a single-partition fetch request
    EncodeFetch {
        /// JSON protocol settings; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        topic: String,
        #[arg(short, long, default_value = "0")]
        partition: i32,
        #[arg(long, default_value = "0")]
        offset: i64,
        #[arg(long, default_value = "1048576")]
        max_bytes: i32,
        #[arg(long, default_value = "0")]
        leader_epoch: i32,
        /// Write raw bytes here instead of printing hex
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Decode a message body read from a file
    Decode {
        #[arg(short, long, value_enum)]
        api: Api,
        #[arg(short, long, value_enum, default_value = "request")]
        kind: Kind,
        #[arg(short, long)]
        version: i16,
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Api {
    Fetch,
    CreateTopics,
    DeleteTopics,
}

impl From<Api> for ApiKey {
    fn from(api: Api) -> Self {
        match api {
            Api::Fetch => ApiKey::Fetch,
            Api::CreateTopics => ApiKey::CreateTopics,
            Api::DeleteTopics => ApiKey::DeleteTopics,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Request,
    Response,
}

fn main() -> Result<()> {
    let args = Args::parse();
    wirelog_common::logging::init_logging(args.log_level);

    match args.command {
        Commands::Versions { release } => print_versions(release),
        Commands::EncodeFetch {
            config,
            topic,
            partition,
            offset,
            max_bytes,
            leader_epoch,
            out,
        } => {
            let config = match config {
                Some(path) => ProtocolConfig::load(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => ProtocolConfig::default(),
            };
            let mut request = FetchRequest::from_config(&config);
            request.add_block(topic.clone(), partition, offset, max_bytes, leader_epoch);

            let metrics = MeterRegistry::new();
            let mut buf = BytesMut::new();
            request.encode_with_metrics(&mut buf, &metrics)?;
            info!(
                version = request.version,
                bytes = buf.len(),
                fetches = metrics.count(wirelog_protocol::metrics::FETCH_RATE_METER, &topic),
                "encoded fetch request"
            );

            match out {
                Some(path) => std::fs::write(&path, &buf)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{}", to_hex(&buf)),
            }
        }
        Commands::Decode {
            api,
            kind,
            version,
            file,
        } => {
            let data = std::fs::read(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let mut buf = Bytes::from(data);
            match kind {
                Kind::Request => {
                    let body = RequestBody::decode(api.into(), version, &mut buf)?;
                    info!(release = %body.required_release(), "decoded request");
                    println!("{body:#?}");
                }
                Kind::Response => {
                    let body = ResponseBody::decode(api.into(), version, &mut buf)?;
                    info!(release = %body.required_release(), "decoded response");
                    println!("{body:#?}");
                }
            }
        }
    }

    Ok(())
}

fn print_versions(release: KafkaRelease) {
    println!("broker release {release}");
    let fetch = FetchRequest::highest_version_for(release);
    let create = CreateTopicsRequest::highest_version_for(release);
    let delete = DeleteTopicsRequest::highest_version_for(release);
    let rows = [
        (ApiKey::Fetch, fetch, FetchRequest::release_for_version(fetch)),
        (
            ApiKey::CreateTopics,
            create,
            CreateTopicsRequest::release_for_version(create),
        ),
        (
            ApiKey::DeleteTopics,
            delete,
            DeleteTopicsRequest::release_for_version(delete),
        ),
    ];
    for (api_key, version, required) in rows {
        println!(
            "  {:<14} v{version:<3} requires {required}",
            format!("{api_key:?}")
        );
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
