use tcp_probe_rs::ports::parse_port_spec;

#[test]
fn parse_singles_ranges_and_whitespace() {
    let ports = parse_port_spec(" 22, 80,443 ,8000-8002").expect("parse ok");
    assert_eq!(ports, vec![22, 80, 443, 8000, 8001, 8002]);
}

#[test]
fn order_and_duplicates_are_preserved() {
    // Duplicate occurrences mean duplicate probes; the parser keeps them.
    let ports = parse_port_spec("443,22,443").expect("parse ok");
    assert_eq!(ports, vec![443, 22, 443]);
}

#[test]
fn invalid_port_rejected() {
    assert!(parse_port_spec("0").is_err());
    assert!(parse_port_spec("65536").is_err());
    assert!(parse_port_spec("8080-80").is_err());
}
