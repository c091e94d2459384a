use polyadicts::{ErrorKind, Polyad, Polyid, Varyad, ntuple, varint};

fn random_value(rng: &mut fastrand::Rng) -> u64 {
    // Spread values across every encoded length.
    let bits = rng.u32(0..=64);
    if bits == 0 { 0 } else { rng.u64(..) >> (64 - bits) }
}

fn random_items(rng: &mut fastrand::Rng, count: usize, max_len: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|_| {
            let len = rng.usize(0..=max_len);
            (0..len).map(|_| rng.u8(..)).collect()
        })
        .collect()
}

#[test]
fn test_varint_roundtrip() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    let mut buf = [0u8; varint::MAX_LEN];
    for _ in 0..10000 {
        let value = random_value(&mut rng);
        let len = varint::encode(value, Some(&mut buf[..])).unwrap();
        assert_eq!(len, varint::encode(value, None).unwrap());
        assert_eq!(len, varint::encoded_len(value));
        assert_eq!(varint::decode(&buf[..len]).unwrap(), (value, len));
        assert_eq!(varint::peek_len(&buf).unwrap(), len);
    }
}

#[test]
fn test_ntuple_roundtrip() {
    let mut rng = fastrand::Rng::with_seed(17);
    for _ in 0..500 {
        let values: Vec<u64> = (0..rng.usize(0..40)).map(|_| random_value(&mut rng)).collect();
        let packed = ntuple::pack_to_vec(&values).unwrap();
        assert_eq!(ntuple::unpack_exact(&packed).unwrap(), values);

        let polyid = Polyid::load(&packed, true).unwrap();
        assert_eq!(polyid.values(), &values[..]);
        assert_eq!(polyid.raw_bytes(), &packed[..]);
        assert_eq!(Polyid::new(values).unwrap().raw_bytes(), &packed[..]);
    }
}

#[test]
fn test_polyad_build_load_roundtrip() {
    let mut rng = fastrand::Rng::with_seed(42);
    for _ in 0..300 {
        let count = rng.usize(0..30);
        let items = random_items(&mut rng, count, 300);
        let built = Polyad::build(&items).unwrap();
        assert_eq!(built.rank(), items.len());

        let loaded = Polyad::load(built.raw_bytes(), rng.bool()).unwrap();
        assert_eq!(loaded.rank(), items.len());
        for (i, item) in items.iter().enumerate() {
            assert_eq!(loaded.item(i).unwrap(), &item[..]);
        }
        assert!(matches!(
            loaded.item(items.len()).unwrap_err().kind(),
            ErrorKind::IndexOutOfRange { .. }
        ));

        // Rebuilding from the loaded items reproduces the same bytes.
        let rebuilt = Polyad::build(&loaded.iter().collect::<Vec<_>>()).unwrap();
        assert_eq!(rebuilt.raw_bytes(), built.raw_bytes());
    }
}

#[test]
fn test_polyad_rejects_corrupt_buffers() {
    let mut rng = fastrand::Rng::with_seed(7);
    for _ in 0..300 {
        let count = rng.usize(1..10);
        let items = random_items(&mut rng, count, 50);
        let polyad = Polyad::build(&items).unwrap();
        let raw = polyad.raw_bytes();

        for cut in 0..raw.len() {
            let err = Polyad::load(&raw[..cut], true).unwrap_err();
            assert!(err.is_data_error(), "{err}");
        }

        let mut extended = raw.to_vec();
        extended.push(rng.u8(..));
        let err = Polyad::load(&extended, true).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Malformed { .. }), "{err}");

        // Bump one declared size: the total no longer matches.
        let header_len = polyad.header_len();
        let mut corrupt = raw.to_vec();
        let target = rng.usize(1..header_len);
        corrupt[target] = if corrupt[target] == 0 { 1 } else { corrupt[target] - 1 };
        let err = Polyad::load(&corrupt, true).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Malformed { .. }), "{err}");
    }
}

#[test]
fn test_varyad_monotonic_across_growth() {
    let mut rng = fastrand::Rng::with_seed(99);
    let mut varyad = Varyad::new(0).unwrap();
    let mut expected = Vec::new();
    let mut last_capacity = varyad.capacity();
    for n in 1..=400 {
        let len = rng.usize(0..64);
        let item: Vec<u8> = (0..len).map(|_| rng.u8(..)).collect();
        let capacity = varyad.push(&item, true).unwrap();
        assert!(capacity >= last_capacity);
        last_capacity = capacity;
        expected.push(item);

        assert_eq!(varyad.rank(), n);
        if n % 50 == 0 {
            for (i, item) in expected.iter().enumerate() {
                assert_eq!(varyad.item(i).unwrap(), &item[..]);
            }
        }
    }

    let polyad = varyad.to_polyad().unwrap();
    assert_eq!(polyad, Polyad::build(&expected).unwrap());
}
