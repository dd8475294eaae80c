mod test_planes;
mod test_properties;
mod test_welding;
