use crate::request::Request;

const MAX_UNIT_ID_LEN: usize = 32;

/// Parses one pipe message into a `Request`. Never panics: anything that
/// doesn't match the grammar, including out-of-range or non-numeric
/// arguments, becomes `Unknown` rather than an error.
pub fn parse_command(message: &[u8]) -> Request {
    let text = match std::str::from_utf8(message) {
        Ok(t) => t,
        Err(_) => return unknown(message),
    };

    if text == "ping" {
        return Request::Ping;
    }
    if text == "GET_TIME_MS" {
        return Request::GetTimeMs;
    }
    if text == "GET_TARGET_GUID" {
        return Request::GetTargetGuid;
    }
    if text == "GET_COMBO_POINTS" {
        return Request::GetComboPoints;
    }

    if let Some(code) = text.strip_prefix("EXEC_LUA:") {
        return Request::ExecScript {
            code: code.as_bytes().to_vec(),
        };
    }

    if let Some(rest) = text.strip_prefix("GET_CD:") {
        return match parse_spell_id(rest) {
            Some(spell_id) => Request::GetCooldown { spell_id },
            None => unknown(message),
        };
    }

    if let Some(rest) = text.strip_prefix("GET_SPELL_INFO:") {
        return match parse_spell_id(rest) {
            Some(spell_id) => Request::GetSpellInfo { spell_id },
            None => unknown(message),
        };
    }

    if let Some(rest) = text.strip_prefix("IS_IN_RANGE:") {
        return parse_is_in_range(rest).unwrap_or_else(|| unknown(message));
    }

    if let Some(rest) = text.strip_prefix("CAST_SPELL:") {
        return parse_cast_spell(rest).unwrap_or_else(|| unknown(message));
    }

    if let Some(rest) = text.strip_prefix("CHECK_BACKSTAB_POS:") {
        return match parse_guid(rest) {
            Some(target_guid) => Request::IsBehindTarget { target_guid },
            None => unknown(message),
        };
    }

    unknown(message)
}

fn unknown(message: &[u8]) -> Request {
    Request::Unknown {
        raw: String::from_utf8_lossy(message).into_owned(),
    }
}

fn parse_spell_id(text: &str) -> Option<i32> {
    let id: i32 = text.parse().ok()?;
    if id < 0 {
        return None;
    }
    Some(id)
}

fn parse_guid(text: &str) -> Option<u64> {
    let trimmed = text.trim();
    if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        trimmed.parse::<u64>().ok()
    }
}

fn parse_is_in_range(rest: &str) -> Option<Request> {
    let (id_part, unit_part) = rest.split_once(',')?;
    let spell_id = parse_spell_id(id_part)?;
    if unit_part.is_empty() || unit_part.len() > MAX_UNIT_ID_LEN {
        return None;
    }
    Some(Request::IsInRange {
        spell_id,
        unit_id: unit_part.to_string(),
    })
}

fn parse_cast_spell(rest: &str) -> Option<Request> {
    match rest.split_once(',') {
        Some((id_part, guid_part)) => {
            let spell_id = parse_spell_id(id_part)?;
            let target_guid = parse_guid(guid_part)?;
            Some(Request::CastSpell {
                spell_id,
                target_guid,
            })
        }
        None => {
            let spell_id = parse_spell_id(rest)?;
            Some(Request::CastSpell {
                spell_id,
                target_guid: 0,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping() {
        assert_eq!(parse_command(b"ping"), Request::Ping);
    }

    #[test]
    fn exec_lua_carries_raw_bytes_including_commas() {
        let req = parse_command(b"EXEC_LUA:return 1,2,3");
        assert_eq!(
            req,
            Request::ExecScript {
                code: b"return 1,2,3".to_vec()
            }
        );
    }

    #[test]
    fn get_cd_parses_spell_id() {
        assert_eq!(
            parse_command(b"GET_CD:133"),
            Request::GetCooldown { spell_id: 133 }
        );
    }

    #[test]
    fn get_cd_negative_is_unknown() {
        assert!(matches!(
            parse_command(b"GET_CD:-1"),
            Request::Unknown { .. }
        ));
    }

    #[test]
    fn is_in_range_parses_unit_id() {
        assert_eq!(
            parse_command(b"IS_IN_RANGE:1752,target"),
            Request::IsInRange {
                spell_id: 1752,
                unit_id: "target".to_string()
            }
        );
    }

    #[test]
    fn is_in_range_missing_unit_is_unknown() {
        assert!(matches!(
            parse_command(b"IS_IN_RANGE:1752"),
            Request::Unknown { .. }
        ));
    }

    #[test]
    fn cast_spell_without_target_defaults_to_zero() {
        assert_eq!(
            parse_command(b"CAST_SPELL:2098"),
            Request::CastSpell {
                spell_id: 2098,
                target_guid: 0
            }
        );
    }

    #[test]
    fn cast_spell_with_hex_guid() {
        assert_eq!(
            parse_command(b"CAST_SPELL:2098,0x00000000ABCDEF01"),
            Request::CastSpell {
                spell_id: 2098,
                target_guid: 0xABCDEF01
            }
        );
    }

    #[test]
    fn check_backstab_pos_parses_guid() {
        assert_eq!(
            parse_command(b"CHECK_BACKSTAB_POS:0x0000000000001234"),
            Request::IsBehindTarget {
                target_guid: 0x1234
            }
        );
    }

    #[test]
    fn unrecognized_command_is_unknown() {
        assert!(matches!(
            parse_command(b"NOT_A_REAL_COMMAND"),
            Request::Unknown { .. }
        ));
    }

    #[test]
    fn invalid_utf8_is_unknown_not_a_panic() {
        let req = parse_command(&[0xff, 0xfe, 0x00, 0x01]);
        assert!(matches!(req, Request::Unknown { .. }));
    }

    proptest::proptest! {
        #[test]
        fn arbitrary_bytes_never_panic(bytes in proptest::collection::vec(proptest::num::u8::ANY, 0..256)) {
            let _ = parse_command(&bytes);
        }
    }
}
