/// Encode `data` as a stored-literal stream readable by [`crate::BackwardLz`].
///
/// No back-references are searched for; the output is always larger than the input. Used by
/// tooling that rewrites assets and by tests that need valid packed fixtures.
pub fn pack_literals(data: &[u8]) -> Vec<u8> {
    let mut bits = Vec::<bool>::with_capacity(data.len() * 9 + 8);
    let mut end = data.len();
    while end > 0 {
        let n = end.min(264);
        if n >= 9 {
            bits.extend([true, true, true]);
            push_code(&mut bits, (n - 9) as u16, 8);
        } else {
            bits.extend([false, false]);
            push_code(&mut bits, (n - 1) as u16, 3);
        }
        for &b in data[end - n..end].iter().rev() {
            push_code(&mut bits, u16::from(b), 8);
        }
        end -= n;
    }

    let head = bits.len().min(31);
    let mut first = 1u32 << head;
    for (i, &b) in bits[..head].iter().enumerate() {
        if b {
            first |= 1 << i;
        }
    }
    let mut words = vec![first];
    for chunk in bits[head..].chunks(32) {
        let mut w = 0u32;
        for (i, &b) in chunk.iter().enumerate() {
            if b {
                w |= 1 << i;
            }
        }
        words.push(w);
    }
    let crc = words.iter().fold(0u32, |acc, w| acc ^ w);

    let mut out = Vec::with_capacity(words.len() * 4 + 8);
    for w in words.iter().rev() {
        out.extend_from_slice(&w.to_be_bytes());
    }
    out.extend_from_slice(&crc.to_be_bytes());
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out
}

fn push_code(bits: &mut Vec<bool>, value: u16, width: u8) {
    for i in (0..width).rev() {
        bits.push(value & (1 << i) != 0);
    }
}
