use ifdmap::error::{BaseField, ConsistencyError, DecodeError};
use ifdmap::firmware::{Firmware, DESCRIPTOR_MAP_OFFSET, FLASH_SIGNATURE, FLASH_SIGNATURE_OFFSET};
use ifdmap::structures::descriptor_map::{DescriptorMap, FLASH_DESCRIPTOR_MAP_SIZE, FLMAP_SIZE};

// FLMAP0..3 of a typical Skylake-era descriptor
const FLMAP: [u8; FLMAP_SIZE] = [
    0x03, 0x00, 0x04, 0x05, 0x06, 0x03, 0x10, 0x12, 0x20, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00,
];

fn image() -> Vec<u8> {
    let mut data = vec![0xff; 0x4000];
    data[FLASH_SIGNATURE_OFFSET..DESCRIPTOR_MAP_OFFSET].copy_from_slice(&FLASH_SIGNATURE.to_le_bytes());
    data[DESCRIPTOR_MAP_OFFSET..][..FLMAP_SIZE].copy_from_slice(&FLMAP);
    data
}

#[test]
fn test_decode_from_image() {
    let firmware = Firmware::from_bytes(image());
    let offset = firmware.descriptor_map_offset();
    let map = firmware.read_descriptor_map(offset).unwrap();

    assert_eq!(map.offset(), 0x14);
    assert_eq!(map.number_of_pch_straps, 0x12);
    assert_eq!(map.proc_straps_base, 0x20);
    assert!(map.validate().is_empty());
    assert_eq!(
        map.to_string(),
        "FlashDescriptorMap{NumberOfRegions=5, NumberOfFlashChips=0, NumberOfMasters=3, \
         NumberOfPchStraps=18, NumberOfProcStraps=1, NumberOfIccTableEntries=0, \
         NumberOfDmiTableEntries=0}"
    );
}

#[test]
fn test_decode_signed_region_dump() {
    let mut data = image();
    data.truncate(FLASH_DESCRIPTOR_MAP_SIZE);
    let firmware = Firmware::from_bytes(data);
    let map = firmware.read_descriptor_map(firmware.descriptor_map_offset()).unwrap();

    assert_eq!(map.offset(), DESCRIPTOR_MAP_OFFSET);
    assert_eq!(*map, DescriptorMap::decode(&image()[DESCRIPTOR_MAP_OFFSET..]).unwrap());
}

#[test]
fn test_decode_size_boundary() {
    let data = vec![0u8; FLASH_DESCRIPTOR_MAP_SIZE];
    assert!(DescriptorMap::decode(&data).is_ok());
    assert!(matches!(
        DescriptorMap::decode(&data[..FLASH_DESCRIPTOR_MAP_SIZE - 1]),
        Err(DecodeError::Size { expected: 0x1000, actual: 0xfff })
    ));
}

#[test]
fn test_each_byte_maps_to_one_field() {
    let base = DescriptorMap::decode(&vec![0u8; FLASH_DESCRIPTOR_MAP_SIZE]).unwrap();
    for i in 0..FLMAP_SIZE {
        let mut data = vec![0u8; FLASH_DESCRIPTOR_MAP_SIZE];
        data[i] = 0x5a;
        let map = DescriptorMap::decode(&data).unwrap();
        assert_ne!(map, base, "byte {i} did not change the map");

        let changed = map
            .fields()
            .iter()
            .zip(base.fields().iter())
            .filter(|(a, b)| a != b)
            .count();
        // reserved bytes are not part of the displayed fields
        assert_eq!(changed, if i < 14 { 1 } else { 0 });
    }
}

#[test]
fn test_verbose_summary_order() {
    let map = DescriptorMap::decode(&image()[DESCRIPTOR_MAP_OFFSET..]).unwrap();
    let expected = "FlashDescriptorMap{
    ComponentBase=3 (0x03)
    NumberOfFlashChips=0 (0x00)
    RegionBase=4 (0x04)
    NumberOfRegions=5 (0x05)
    MasterBase=6 (0x06)
    NumberOfMasters=3 (0x03)
    PchStrapsBase=16 (0x10)
    NumberOfPchStraps=18 (0x12)
    ProcStrapsBase=32 (0x20)
    NumberOfProcStraps=1 (0x01)
    IccTableBase=0 (0x00)
    NumberOfIccTableEntries=0 (0x00)
    DmiTableBase=0 (0x00)
    NumberOfDmiTableEntries=0 (0x00)
}";
    assert_eq!(map.summary(), expected);
}

#[test]
fn test_validate_reports_in_rule_order() {
    let mut data = vec![0u8; FLASH_DESCRIPTOR_MAP_SIZE];
    data[0] = 0x10; // ComponentBase
    data[2] = 0xf0; // RegionBase
    data[4] = 0x10; // MasterBase
    let errors = DescriptorMap::decode(&data).unwrap().validate();

    assert_eq!(
        errors,
        vec![
            ConsistencyError::BaseTooLarge {
                field: BaseField::RegionBase,
                limit: 0xe0,
                actual: 0xf0,
            },
            ConsistencyError::Overlap {
                first: BaseField::MasterBase,
                second: BaseField::ComponentBase,
                shared: 0x10,
            },
        ]
    );
}
