use crate::transcript::parse_record;
use serde_json::Value;

/// The counter lives at `usage.cache_read_input_tokens` on bare records and
/// `message.usage.cache_read_input_tokens` on Claude Code message records.
/// Only a strictly positive value makes a record cache-bearing.
pub fn positive_cache_read_tokens(record: &Value) -> Option<u64> {
    record["usage"]["cache_read_input_tokens"]
        .as_u64()
        .filter(|n| *n > 0)
        .or_else(|| {
            record["message"]["usage"]["cache_read_input_tokens"]
                .as_u64()
                .filter(|n| *n > 0)
        })
}

/// Zeroes the counter on the *last* cache-bearing record of the input. Every
/// other line passes through byte-identical; if no record is cache-bearing
/// the whole input does.
///
/// Downstream consumers derive a context-size indicator from the last
/// positive value; zeroing exactly that one suppresses the indicator without
/// touching earlier history. The rewritten record is re-serialized by
/// serde_json, so its key order may differ from the input line.
pub fn zero_last_cache_counter(lines: &[String]) -> Vec<String> {
    let target = lines.iter().enumerate().rev().find_map(|(i, line)| {
        let record = parse_record(line)?;
        positive_cache_read_tokens(&record).map(|_| (i, record))
    });

    let mut out = lines.to_vec();
    if let Some((i, mut record)) = target {
        if record["usage"]["cache_read_input_tokens"]
            .as_u64()
            .is_some_and(|n| n > 0)
        {
            record["usage"]["cache_read_input_tokens"] = 0.into();
        } else {
            record["message"]["usage"]["cache_read_input_tokens"] = 0.into();
        }
        out[i] = record.to_string();
    }
    out
}
