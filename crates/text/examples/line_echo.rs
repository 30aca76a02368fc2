//! Echoes every received line back, numbered, in the connection's charset.
//!
//! ```text
//! cargo run --example line_echo -- shift_jis
//! printf 'hello\r\nworld\n' | nc 127.0.0.1 8080
//! ```

use micro_text::codec::EncodingCodec;
use micro_text::options::ReaderOptions;
use micro_text::reader::StreamTextReader;
use micro_text::sink::{AsyncByteSink, IoSink};
use micro_text::source::AsyncReadSource;
use micro_text::text::{AsyncTextSink, AsyncTextSource};
use micro_text::writer::PipeTextWriter;
use micro_text::TextError;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let label = std::env::args().nth(1).unwrap_or_else(|| "utf-8".to_owned());
    if let Err(e) = EncodingCodec::for_label(&label) {
        error!(cause = %e, "unsupported charset");
        return;
    }

    info!(port = 8080, charset = %label, "start listening");
    let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
        Ok(tcp_listener) => tcp_listener,
        Err(e) => {
            error!(cause = %e, "bind server error");
            return;
        }
    };

    loop {
        let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
            Ok(stream_and_addr) => stream_and_addr,
            Err(e) => {
                warn!(cause = %e, "failed to accept");
                continue;
            }
        };

        let label = label.clone();
        tokio::spawn(async move {
            match echo_lines(tcp_stream, &label).await {
                Ok(lines) => info!(%remote_addr, lines, "finished echo, connection shutdown"),
                Err(e) => error!(%remote_addr, cause = %e, "echo failed, connection shutdown"),
            }
        });
    }
}

async fn echo_lines(tcp_stream: TcpStream, label: &str) -> Result<usize, TextError> {
    let (reader, writer) = tcp_stream.into_split();

    let source = AsyncReadSource::new(reader);
    let mut reader = StreamTextReader::with_options(source, EncodingCodec::for_label(label)?, ReaderOptions::default())?;
    let mut writer = PipeTextWriter::new(IoSink::new(writer), EncodingCodec::for_label(label)?)?;

    let mut count = 0;
    while let Some(line) = reader.read_line_async().await? {
        count += 1;
        writer.write_line_async(&format!("{count}: {line}")).await?;
        writer.flush_async().await?;
        writer.get_mut().flush().await?;
    }

    reader.dispose();
    writer.dispose_async().await?;
    Ok(count)
}
