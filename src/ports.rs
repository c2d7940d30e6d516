use anyhow::{bail, Context, Result};

/// Parse a port specification into an ordered list of TCP ports (1..=65535).
///
/// Supported elements, comma separated:
/// - single port number: `80`
/// - inclusive range: `8000-8010`
/// - whitespace around elements is ignored
///
/// Order is preserved and duplicates are kept: the scanner probes ports in
/// exactly the order given, once per occurrence.
pub fn parse_port_spec(s: &str) -> Result<Vec<u16>> {
    let mut out: Vec<u16> = Vec::new();

    for raw in s.split(',') {
        let part = raw.trim();
        if part.is_empty() {
            continue;
        }

        // Range `start-end`
        if let Some((a, b)) = part.split_once('-') {
            let start = parse_port_str(a.trim())
                .with_context(|| format!("invalid start in range: {a}"))?;
            let end = parse_port_str(b.trim())
                .with_context(|| format!("invalid end in range: {b}"))?;
            if start > end {
                bail!("invalid range {start}-{end} (start > end)");
            }
            out.extend(start..=end);
            continue;
        }

        // Single number
        let p = parse_port_str(part).with_context(|| format!("invalid port value: {part}"))?;
        out.push(p);
    }

    if out.is_empty() {
        bail!("port specification is empty");
    }
    Ok(out)
}

/// A conservative default list of commonly probed TCP ports.
pub fn default_ports() -> Vec<u16> {
    const DEFAULT: &[u16] = &[
        21, 22, 23, 25, 53, 80, 110, 135, 139, 143, 443, 445, 465, 587, 993, 995, 1433, 3306,
        3389, 5432, 5900, 6379, 8000, 8080, 8443, 9200, 27017,
    ];
    DEFAULT.to_vec()
}

fn parse_port_str(s: &str) -> Result<u16> {
    let val: u32 = s.parse::<u32>().map_err(|e| anyhow::anyhow!(e))?;
    if val == 0 || val > 65535 {
        bail!("port out of range: {val}");
    }
    Ok(val as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_ports() {
        let ports = parse_port_spec("80, 22,   443").unwrap();
        assert_eq!(ports, vec![80, 22, 443]);
    }

    #[test]
    fn parse_ranges_preserve_order() {
        let ports = parse_port_spec("8000-8002,80").unwrap();
        assert_eq!(ports, vec![8000, 8001, 8002, 80]);
    }

    #[test]
    fn duplicates_are_kept() {
        let ports = parse_port_spec("80,80,8000-8001,8000").unwrap();
        assert_eq!(ports, vec![80, 80, 8000, 8001, 8000]);
    }

    #[test]
    fn invalid_values_error() {
        assert!(parse_port_spec("0").is_err());
        assert!(parse_port_spec("70000").is_err());
        assert!(parse_port_spec("abc").is_err());
        assert!(parse_port_spec("9000-8000").is_err());
        assert!(parse_port_spec("").is_err());
    }

    #[test]
    fn default_has_common_ports() {
        let d = default_ports();
        assert!(!d.is_empty());
        assert!(d.contains(&80) && d.contains(&443));
    }
}
