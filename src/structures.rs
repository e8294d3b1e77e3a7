pub mod descriptor_map;
