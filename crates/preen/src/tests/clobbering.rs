use super::clean;

#[test]
fn forms_with_shadowing_controls_are_dropped() {
    assert_eq!(
        clean(r#"<form><input name="attributes"></form><p>ok</p>"#),
        "<p>ok</p>"
    );
    assert_eq!(
        clean(r#"<form><fieldset><img id="removeChild"></fieldset></form>"#),
        ""
    );
}

#[test]
fn ordinary_forms_survive() {
    let input = r#"<form><input name="email"><button>go</button></form>"#;
    assert_eq!(clean(input), input);
}

#[test]
fn member_names_match_exactly() {
    let input = r#"<form><input name="NODENAME"></form>"#;
    assert_eq!(clean(input), input);
}
