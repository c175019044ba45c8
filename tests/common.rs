pub mod builders {
    //! Assemble bitmap and metrics variation tables in memory.
    #![allow(dead_code)]

    /// Two `SbitLineMetrics` records.
    const LINE_METRICS: &[u8] = &[0; 24];
    /// A `BigGlyphMetrics` record.
    const BIG_GLYPH_METRICS: &[u8] = &[0; 8];

    fn u32_of(value: usize) -> u32 {
        u32::try_from(value).unwrap()
    }

    fn u16_of(value: usize) -> u16 {
        u16::try_from(value).unwrap()
    }

    fn push_u16(data: &mut Vec<u8>, value: u16) {
        data.extend_from_slice(&value.to_be_bytes());
    }

    fn push_u32(data: &mut Vec<u8>, value: u32) {
        data.extend_from_slice(&value.to_be_bytes());
    }

    /// A `BitmapSize` record and the index sub-tables it owns.
    #[derive(Debug, Clone)]
    pub struct Strike {
        pub start_glyph_index: u16,
        pub end_glyph_index: u16,
        pub bit_depth: u8,
        pub flags: u8,
        pub color_ref: u32,
        /// `(firstGlyphIndex, lastGlyphIndex, sub-table bytes)`
        pub sub_tables: Vec<(u16, u16, Vec<u8>)>,
    }

    impl Strike {
        pub fn new(start_glyph_index: u16, end_glyph_index: u16, bit_depth: u8) -> Self {
            Strike {
                start_glyph_index,
                end_glyph_index,
                bit_depth,
                flags: 1,
                color_ref: 0,
                sub_tables: Vec::new(),
            }
        }

        pub fn sub_table(mut self, first: u16, last: u16, data: Vec<u8>) -> Self {
            self.sub_tables.push((first, last, data));
            self
        }
    }

    /// An `EBDT`/`CBDT` table with `payload_len` bytes of image data after the header.
    pub fn bitmap_data(major_version: u16, payload_len: usize) -> Vec<u8> {
        let mut data = Vec::new();
        push_u16(&mut data, major_version);
        push_u16(&mut data, 0);
        data.resize(data.len() + payload_len, 0);
        data
    }

    /// An `EBLC`/`CBLC` table. Each strike's index sub-table array and sub-tables follow the
    /// size records in order.
    pub fn bitmap_location(major_version: u16, strikes: &[Strike]) -> Vec<u8> {
        let mut data = Vec::new();
        push_u16(&mut data, major_version);
        push_u16(&mut data, 0);
        push_u32(&mut data, u32_of(strikes.len()));

        let mut array_offset = 8 + 48 * strikes.len();
        let mut arrays = Vec::new();
        for strike in strikes {
            let array_len = 8 * strike.sub_tables.len();
            let sub_tables_len: usize =
                strike.sub_tables.iter().map(|(_, _, data)| data.len()).sum();
            push_u32(&mut data, u32_of(array_offset));
            push_u32(&mut data, u32_of(array_len + sub_tables_len));
            push_u32(&mut data, u32_of(strike.sub_tables.len()));
            push_u32(&mut data, strike.color_ref);
            data.extend_from_slice(LINE_METRICS);
            push_u16(&mut data, strike.start_glyph_index);
            push_u16(&mut data, strike.end_glyph_index);
            data.extend_from_slice(&[16, 16, strike.bit_depth, strike.flags]);

            let mut additional_offset = array_len;
            for (first, last, sub_table) in &strike.sub_tables {
                push_u16(&mut arrays, *first);
                push_u16(&mut arrays, *last);
                push_u32(&mut arrays, u32_of(additional_offset));
                additional_offset += sub_table.len();
            }
            for (_, _, sub_table) in &strike.sub_tables {
                arrays.extend_from_slice(sub_table);
            }
            array_offset += array_len + sub_tables_len;
        }
        data.extend_from_slice(&arrays);
        data
    }

    /// The eight byte header shared by all index sub-table formats.
    pub fn index_sub_table_header(
        index_format: u16,
        image_format: u16,
        image_data_offset: u32,
    ) -> Vec<u8> {
        let mut data = Vec::new();
        push_u16(&mut data, index_format);
        push_u16(&mut data, image_format);
        push_u32(&mut data, image_data_offset);
        data
    }

    pub fn index_sub_table_1(
        image_format: u16,
        image_data_offset: u32,
        offsets: &[u32],
    ) -> Vec<u8> {
        let mut data = index_sub_table_header(1, image_format, image_data_offset);
        for offset in offsets {
            push_u32(&mut data, *offset);
        }
        data
    }

    pub fn index_sub_table_2(
        image_format: u16,
        image_data_offset: u32,
        image_size: u32,
    ) -> Vec<u8> {
        let mut data = index_sub_table_header(2, image_format, image_data_offset);
        push_u32(&mut data, image_size);
        data.extend_from_slice(BIG_GLYPH_METRICS);
        data
    }

    pub fn index_sub_table_3(
        image_format: u16,
        image_data_offset: u32,
        offsets: &[u16],
    ) -> Vec<u8> {
        let mut data = index_sub_table_header(3, image_format, image_data_offset);
        for offset in offsets {
            push_u16(&mut data, *offset);
        }
        data
    }

    /// `pairs` is `(glyphID, sbitOffset)` and includes the trailing pair that ends the last
    /// glyph's data.
    pub fn index_sub_table_4(
        image_format: u16,
        image_data_offset: u32,
        pairs: &[(u16, u16)],
    ) -> Vec<u8> {
        let mut data = index_sub_table_header(4, image_format, image_data_offset);
        push_u32(&mut data, u32_of(pairs.len().saturating_sub(1)));
        for (glyph_id, offset) in pairs {
            push_u16(&mut data, *glyph_id);
            push_u16(&mut data, *offset);
        }
        data
    }

    pub fn index_sub_table_5(
        image_format: u16,
        image_data_offset: u32,
        image_size: u32,
        glyph_ids: &[u16],
    ) -> Vec<u8> {
        let mut data = index_sub_table_header(5, image_format, image_data_offset);
        push_u32(&mut data, image_size);
        data.extend_from_slice(BIG_GLYPH_METRICS);
        push_u32(&mut data, u32_of(glyph_ids.len()));
        for glyph_id in glyph_ids {
            push_u16(&mut data, *glyph_id);
        }
        data
    }

    /// An `MVAR` table. The records are padded to `value_record_size` and the item variation
    /// store, if any, is placed directly after them.
    pub fn metrics_variations(
        value_record_size: u16,
        records: &[(u32, u16, u16)],
        item_variation_store: Option<&[u8]>,
    ) -> Vec<u8> {
        let store_offset = match item_variation_store {
            Some(_) => 12 + usize::from(value_record_size) * records.len(),
            None => 0,
        };
        let mut data = Vec::new();
        for value in [1, 0, 0, value_record_size] {
            push_u16(&mut data, value);
        }
        push_u16(&mut data, u16_of(records.len()));
        push_u16(&mut data, u16_of(store_offset));
        for (tag, outer, inner) in records {
            let start = data.len();
            push_u32(&mut data, *tag);
            push_u16(&mut data, *outer);
            push_u16(&mut data, *inner);
            data.resize(start + usize::from(value_record_size).max(8), 0);
        }
        if let Some(store) = item_variation_store {
            data.extend_from_slice(store);
        }
        data
    }

    /// Start, peak, and end of a single axis region in F2DOT14.
    #[derive(Debug, Copy, Clone)]
    pub struct Region {
        pub start: i16,
        pub peak: i16,
        pub end: i16,
    }

    impl Region {
        pub fn new(start: i16, peak: i16, end: i16) -> Self {
            Region { start, peak, end }
        }
    }

    /// An `ItemVariationStore` on a single axis with one item variation data sub-table holding
    /// one delta-set row.
    pub fn item_variation_store(
        regions: &[Region],
        word_delta_count: u16,
        region_indexes: &[u16],
        deltas: &[u8],
    ) -> Vec<u8> {
        // format, variationRegionListOffset, itemVariationDataCount, offsets[1]
        let region_list_offset = 12;
        let data_offset = region_list_offset + 4 + 6 * regions.len();

        let mut data = Vec::new();
        push_u16(&mut data, 1);
        push_u32(&mut data, u32_of(region_list_offset));
        push_u16(&mut data, 1);
        push_u32(&mut data, u32_of(data_offset));

        push_u16(&mut data, 1);
        push_u16(&mut data, u16_of(regions.len()));
        for region in regions {
            for coord in [region.start, region.peak, region.end] {
                data.extend_from_slice(&coord.to_be_bytes());
            }
        }

        push_u16(&mut data, 1);
        push_u16(&mut data, word_delta_count);
        push_u16(&mut data, u16_of(region_indexes.len()));
        for index in region_indexes {
            push_u16(&mut data, *index);
        }
        data.extend_from_slice(deltas);
        data
    }
}
