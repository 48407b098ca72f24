//! SEED block cipher (RFC 4269).

use zeroize::{Zeroize, ZeroizeOnDrop};

const BLOCK_LEN: usize = 16;
const ROUNDS: usize = 16;

/// Golden ratio constant for the first round key.
const KC0: u32 = 0x9e37_79b9;

const S1: [u8; 256] = [
    0xa9, 0x85, 0xd6, 0xd3, 0x54, 0x1d, 0xac, 0x25, 0x5d, 0x43, 0x18, 0x1e, 0x51, 0xfc, 0xca, 0x63,
    0x28, 0x44, 0x20, 0x9d, 0xe0, 0xe2, 0xc8, 0x17, 0xa5, 0x8f, 0x03, 0x7b, 0xbb, 0x13, 0xd2, 0xee,
    0x70, 0x8c, 0x3f, 0xa8, 0x32, 0xdd, 0xf6, 0x74, 0xec, 0x95, 0x0b, 0x57, 0x5c, 0x5b, 0xbd, 0x01,
    0x24, 0x1c, 0x73, 0x98, 0x10, 0xcc, 0xf2, 0xd9, 0x2c, 0xe7, 0x72, 0x83, 0x9b, 0xd1, 0x86, 0xc9,
    0x60, 0x50, 0xa3, 0xeb, 0x0d, 0xb6, 0x9e, 0x4f, 0xb7, 0x5a, 0xc6, 0x78, 0xa6, 0x12, 0xaf, 0xd5,
    0x61, 0xc3, 0xb4, 0x41, 0x52, 0x7d, 0x8d, 0x08, 0x1f, 0x99, 0x00, 0x19, 0x04, 0x53, 0xf7, 0xe1,
    0xfd, 0x76, 0x2f, 0x27, 0xb0, 0x8b, 0x0e, 0xab, 0xa2, 0x6e, 0x93, 0x4d, 0x69, 0x7c, 0x09, 0x0a,
    0xbf, 0xef, 0xf3, 0xc5, 0x87, 0x14, 0xfe, 0x64, 0xde, 0x2e, 0x4b, 0x1a, 0x06, 0x21, 0x6b, 0x66,
    0x02, 0xf5, 0x92, 0x8a, 0x0c, 0xb3, 0x7e, 0xd0, 0x7a, 0x47, 0x96, 0xe5, 0x26, 0x80, 0xad, 0xdf,
    0xa1, 0x30, 0x37, 0xae, 0x36, 0x15, 0x22, 0x38, 0xf4, 0xa7, 0x45, 0x4c, 0x81, 0xe9, 0x84, 0x97,
    0x35, 0xcb, 0xce, 0x3c, 0x71, 0x11, 0xc7, 0x89, 0x75, 0xfb, 0xda, 0xf8, 0x94, 0x59, 0x82, 0xc4,
    0xff, 0x49, 0x39, 0x67, 0xc0, 0xcf, 0xd7, 0xb8, 0x0f, 0x8e, 0x42, 0x23, 0x91, 0x6c, 0xdb, 0xa4,
    0x34, 0xf1, 0x48, 0xc2, 0x6f, 0x3d, 0x2d, 0x40, 0xbe, 0x3e, 0xbc, 0xc1, 0xaa, 0xba, 0x4e, 0x55,
    0x3b, 0xdc, 0x68, 0x7f, 0x9c, 0xd8, 0x4a, 0x56, 0x77, 0xa0, 0xed, 0x46, 0xb5, 0x2b, 0x65, 0xfa,
    0xe3, 0xb9, 0xb1, 0x9f, 0x5e, 0xf9, 0xe6, 0xb2, 0x31, 0xea, 0x6d, 0x5f, 0xe4, 0xf0, 0xcd, 0x88,
    0x16, 0x3a, 0x58, 0xd4, 0x62, 0x29, 0x07, 0x33, 0xe8, 0x1b, 0x05, 0x79, 0x90, 0x6a, 0x2a, 0x9a,
];
const S2: [u8; 256] = [
    0x38, 0xe8, 0x2d, 0xa6, 0xcf, 0xde, 0xb3, 0xb8, 0xaf, 0x60, 0x55, 0xc7, 0x44, 0x6f, 0x6b, 0x5b,
    0xc3, 0x62, 0x33, 0xb5, 0x29, 0xa0, 0xe2, 0xa7, 0xd3, 0x91, 0x11, 0x06, 0x1c, 0xbc, 0x36, 0x4b,
    0xef, 0x88, 0x6c, 0xa8, 0x17, 0xc4, 0x16, 0xf4, 0xc2, 0x45, 0xe1, 0xd6, 0x3f, 0x3d, 0x8e, 0x98,
    0x28, 0x4e, 0xf6, 0x3e, 0xa5, 0xf9, 0x0d, 0xdf, 0xd8, 0x2b, 0x66, 0x7a, 0x27, 0x2f, 0xf1, 0x72,
    0x42, 0xd4, 0x41, 0xc0, 0x73, 0x67, 0xac, 0x8b, 0xf7, 0xad, 0x80, 0x1f, 0xca, 0x2c, 0xaa, 0x34,
    0xd2, 0x0b, 0xee, 0xe9, 0x5d, 0x94, 0x18, 0xf8, 0x57, 0xae, 0x08, 0xc5, 0x13, 0xcd, 0x86, 0xb9,
    0xff, 0x7d, 0xc1, 0x31, 0xf5, 0x8a, 0x6a, 0xb1, 0xd1, 0x20, 0xd7, 0x02, 0x22, 0x04, 0x68, 0x71,
    0x07, 0xdb, 0x9d, 0x99, 0x61, 0xbe, 0xe6, 0x59, 0xdd, 0x51, 0x90, 0xdc, 0x9a, 0xa3, 0xab, 0xd0,
    0x81, 0x0f, 0x47, 0x1a, 0xe3, 0xec, 0x8d, 0xbf, 0x96, 0x7b, 0x5c, 0xa2, 0xa1, 0x63, 0x23, 0x4d,
    0xc8, 0x9e, 0x9c, 0x3a, 0x0c, 0x2e, 0xba, 0x6e, 0x9f, 0x5a, 0xf2, 0x92, 0xf3, 0x49, 0x78, 0xcc,
    0x15, 0xfb, 0x70, 0x75, 0x7f, 0x35, 0x10, 0x03, 0x64, 0x6d, 0xc6, 0x74, 0xd5, 0xb4, 0xea, 0x09,
    0x76, 0x19, 0xfe, 0x40, 0x12, 0xe0, 0xbd, 0x05, 0xfa, 0x01, 0xf0, 0x2a, 0x5e, 0xa9, 0x56, 0x43,
    0x85, 0x14, 0x89, 0x9b, 0xb0, 0xe5, 0x48, 0x79, 0x97, 0xfc, 0x1e, 0x82, 0x21, 0x8c, 0x1b, 0x5f,
    0x77, 0x54, 0xb2, 0x1d, 0x25, 0x4f, 0x00, 0x46, 0xed, 0x58, 0x52, 0xeb, 0x7e, 0xda, 0xc9, 0xfd,
    0x30, 0x95, 0x65, 0x3c, 0xb6, 0xe4, 0xbb, 0x7c, 0x0e, 0x50, 0x39, 0x26, 0x32, 0x84, 0x69, 0x93,
    0x37, 0xe7, 0x24, 0xa4, 0xcb, 0x53, 0x0a, 0x87, 0xd9, 0x4c, 0x83, 0x8f, 0xce, 0x3b, 0x4a, 0xb7,
];

/// SEED with an expanded 128-bit key.
#[derive(Clone)]
pub struct Seed {
    round_keys: [[u32; 2]; ROUNDS],
}

impl Drop for Seed {
    fn drop(&mut self) {
        self.round_keys.zeroize();
    }
}

impl ZeroizeOnDrop for Seed {}

impl Seed {
    pub const KEY_LEN: usize = 16;
    pub const BLOCK_LEN: usize = BLOCK_LEN;

    pub fn new(key: &[u8; 16]) -> Self {
        let mut a = u32::from_be_bytes([key[0], key[1], key[2], key[3]]);
        let mut b = u32::from_be_bytes([key[4], key[5], key[6], key[7]]);
        let mut c = u32::from_be_bytes([key[8], key[9], key[10], key[11]]);
        let mut d = u32::from_be_bytes([key[12], key[13], key[14], key[15]]);

        let mut round_keys = [[0u32; 2]; ROUNDS];
        let mut kc = KC0;
        for (i, rk) in round_keys.iter_mut().enumerate() {
            rk[0] = g(a.wrapping_add(c).wrapping_sub(kc));
            rk[1] = g(b.wrapping_sub(d).wrapping_add(kc));

            if i % 2 == 0 {
                let ab = (((a as u64) << 32) | b as u64).rotate_right(8);
                a = (ab >> 32) as u32;
                b = ab as u32;
            } else {
                let cd = (((c as u64) << 32) | d as u64).rotate_left(8);
                c = (cd >> 32) as u32;
                d = cd as u32;
            }
            kc = kc.rotate_left(1);
        }

        Seed { round_keys }
    }

    pub fn encrypt_block(&self, block: &mut [u8]) {
        self.crypt(block, self.round_keys.iter());
    }

    pub fn decrypt_block(&self, block: &mut [u8]) {
        self.crypt(block, self.round_keys.iter().rev());
    }

    fn crypt<'a>(&self, block: &mut [u8], keys: impl Iterator<Item = &'a [u32; 2]>) {
        let word = |i: usize| {
            u32::from_be_bytes([block[i], block[i + 1], block[i + 2], block[i + 3]])
        };
        let (mut l0, mut l1, mut r0, mut r1) = (word(0), word(4), word(8), word(12));

        for k in keys {
            let (f0, f1) = f(r0, r1, k);
            let (n0, n1) = (l0 ^ f0, l1 ^ f1);
            l0 = r0;
            l1 = r1;
            r0 = n0;
            r1 = n1;
        }

        // The last round is not swapped.
        block[0..4].copy_from_slice(&r0.to_be_bytes());
        block[4..8].copy_from_slice(&r1.to_be_bytes());
        block[8..12].copy_from_slice(&l0.to_be_bytes());
        block[12..16].copy_from_slice(&l1.to_be_bytes());
    }
}

fn g(x: u32) -> u32 {
    const M0: u8 = 0xfc;
    const M1: u8 = 0xf3;
    const M2: u8 = 0xcf;
    const M3: u8 = 0x3f;

    let [x3, x2, x1, x0] = x.to_be_bytes();
    let (a, b, c, d) = (
        S1[x0 as usize],
        S2[x1 as usize],
        S1[x2 as usize],
        S2[x3 as usize],
    );

    let z0 = (a & M0) ^ (b & M1) ^ (c & M2) ^ (d & M3);
    let z1 = (a & M1) ^ (b & M2) ^ (c & M3) ^ (d & M0);
    let z2 = (a & M2) ^ (b & M3) ^ (c & M0) ^ (d & M1);
    let z3 = (a & M3) ^ (b & M0) ^ (c & M1) ^ (d & M2);

    u32::from_be_bytes([z3, z2, z1, z0])
}

fn f(c: u32, d: u32, k: &[u32; 2]) -> (u32, u32) {
    let a = c ^ k[0];
    let b = d ^ k[1];
    let t = g(a ^ b);
    let u = g(t.wrapping_add(a));
    let d = g(u.wrapping_add(t));
    let c = d.wrapping_add(u);
    (c, d)
}
