//! Line reader behaviour across chunk boundaries.

use std::io::{self, Cursor, Write};

use flate2::Compression;
use flate2::write::GzEncoder;
use proptest::prelude::*;

use pipeline_ingest::{IngestError, LineReader};

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("compress");
    encoder.finish().expect("finish")
}

/// Split `data` at the given cut points (positions are clamped and sorted).
fn split_at(data: &[u8], cuts: &[usize]) -> Vec<io::Result<Vec<u8>>> {
    let mut points: Vec<usize> = cuts.iter().map(|c| c % (data.len() + 1)).collect();
    points.sort_unstable();
    let mut chunks = Vec::new();
    let mut start = 0;
    for point in points {
        chunks.push(Ok(data[start..point].to_vec()));
        start = point;
    }
    chunks.push(Ok(data[start..].to_vec()));
    chunks
}

fn read_all<R: io::Read>(reader: LineReader<R>) -> Vec<String> {
    reader
        .collect::<Result<Vec<_>, IngestError>>()
        .expect("read lines")
}

/// Whole-payload reference: split on `\n`, drop a trailing empty piece.
fn reference_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    if lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines
}

#[test]
fn last_line_without_newline_is_kept() {
    let compressed = gzip("id;navn\n0011;Lodalen\n0012;Grønland".as_bytes());
    let lines = read_all(LineReader::new(Cursor::new(compressed), true).expect("reader"));
    assert_eq!(lines, vec!["id;navn", "0011;Lodalen", "0012;Grønland"]);

    let plain = "id;navn\n0011;Lodalen".as_bytes().to_vec();
    let lines = read_all(LineReader::new(Cursor::new(plain), false).expect("reader"));
    assert_eq!(lines, vec!["id;navn", "0011;Lodalen"]);
}

#[test]
fn multibyte_character_split_across_chunks() {
    let text = "navn\nGrünerløkka øst\n";
    let bytes = text.as_bytes();
    // 'ü' is two bytes; cut between them.
    let cut = text.find('ü').expect("ü present") + 1;
    let chunks = vec![Ok(bytes[..cut].to_vec()), Ok(bytes[cut..].to_vec())];

    let lines = read_all(LineReader::from_chunks(chunks, false).expect("reader"));
    assert_eq!(lines, vec!["navn", "Grünerløkka øst"]);
}

#[test]
fn tiny_read_buffer_still_assembles_lines() {
    let text = "delbydel_id;navn\n0016;Vålerenga\n0017;Helsfyr\n";
    let compressed = gzip(text.as_bytes());
    let reader =
        LineReader::with_chunk_size(Cursor::new(compressed), true, 1).expect("reader");
    assert_eq!(
        read_all(reader),
        vec!["delbydel_id;navn", "0016;Vålerenga", "0017;Helsfyr"]
    );
}

proptest! {
    #[test]
    fn gzip_lines_are_chunk_boundary_invariant(
        lines in prop::collection::vec("[a-zæøå0-9;,\"é€ ]{0,12}", 0..20),
        trailing_newline in any::<bool>(),
        cuts in prop::collection::vec(any::<usize>(), 0..8),
        chunk_size in 1usize..64,
    ) {
        let mut text = lines.join("\n");
        if trailing_newline && !text.is_empty() {
            text.push('\n');
        }
        let compressed = gzip(text.as_bytes());

        let reader = LineReader::with_chunk_size(
            pipeline_ingest::ChunkSource::new(split_at(&compressed, &cuts)),
            true,
            chunk_size,
        )
        .expect("reader");

        prop_assert_eq!(read_all(reader), reference_lines(&text));
    }

    #[test]
    fn plain_lines_are_chunk_boundary_invariant(
        lines in prop::collection::vec("[a-z0-9;ø€]{1,10}", 0..20),
        cuts in prop::collection::vec(any::<usize>(), 0..8),
    ) {
        let text = lines.join("\n");
        let reader = LineReader::from_chunks(split_at(text.as_bytes(), &cuts), false)
            .expect("reader");
        prop_assert_eq!(read_all(reader), lines);
    }
}
